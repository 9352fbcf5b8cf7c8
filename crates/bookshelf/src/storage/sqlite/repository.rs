//! SQLite repository implementation.
//!
//! Implements `BookStore` and `UserStore` from `bookshelf_core::storage`.
//! Every write runs inside a transaction on the connection thread.

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use bookshelf_core::auth::{NewUser, User};
use bookshelf_core::book::{Book, BookFilters, BookId, NewBook};
use bookshelf_core::storage::{BookMutation, BookStore, RepositoryError, Result, UserStore};

use super::conversions::{id_to_sql, row_to_book, row_to_user, rowid_to_id};
use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-based store for books and users.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens (or creates) a file-based database and applies the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a repository backed by an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

fn select_book(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<Book>> {
    let mut stmt = conn.prepare_cached(schema::SELECT_BOOK_BY_ID)?;
    match stmt.query_row([id], row_to_book) {
        Ok(book) => Ok(Some(book)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl BookStore for SqliteRepository {
    async fn find_books(
        &self,
        filters: &BookFilters,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Book>> {
        let (sql, params) = schema::select_books_query(filters, offset, limit);

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(params.iter()), row_to_book)
                    .map_err(wrap_err)?;

                let mut books = Vec::new();
                for row_result in rows {
                    books.push(row_result.map_err(wrap_err)?);
                }
                Ok(books)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Book", ""))
    }

    async fn find_book(&self, id: BookId) -> Result<Option<Book>> {
        let Some(sql_id) = id_to_sql(id) else {
            return Ok(None);
        };

        self.conn
            .call(move |conn| select_book(conn, sql_id).map_err(wrap_err))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Book", id.to_string()))
    }

    async fn insert_book(&self, book: &NewBook) -> Result<Book> {
        let book = book.clone();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(
                    schema::INSERT_BOOK,
                    rusqlite::params![book.title, book.author, book.image_path],
                )
                .map_err(wrap_err)?;
                let id = rowid_to_id(tx.last_insert_rowid()).map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(book.into_book(id))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Book", ""))
    }

    async fn update_book(&self, id: BookId, mutation: BookMutation) -> Result<Option<Book>> {
        let Some(sql_id) = id_to_sql(id) else {
            return Ok(None);
        };

        self.conn
            .call(move |conn| {
                // Dropping the transaction without commit rolls it back
                let tx = conn.transaction().map_err(wrap_err)?;

                let Some(mut book) = select_book(&tx, sql_id).map_err(wrap_err)? else {
                    return Ok(None);
                };

                mutation(&mut book);
                book.id = id;

                tx.execute(
                    schema::UPDATE_BOOK,
                    rusqlite::params![sql_id, book.title, book.author, book.image_path],
                )
                .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;

                Ok(Some(book))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Book", id.to_string()))
    }

    async fn delete_book(&self, id: BookId) -> Result<()> {
        let Some(sql_id) = id_to_sql(id) else {
            return Ok(());
        };

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(schema::DELETE_BOOK, [sql_id]).map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Book", id.to_string()))
    }
}

#[async_trait]
impl UserStore for SqliteRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.to_string();
        let lookup = username.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare_cached(schema::SELECT_USER_BY_USERNAME)
                    .map_err(wrap_err)?;
                match stmt.query_row([&lookup], row_to_user) {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", username))
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let user = user.clone();
        let username = user.username.clone();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(
                    schema::INSERT_USER,
                    rusqlite::params![user.username, user.password_hash],
                )
                .map_err(wrap_err)?;
                let id = rowid_to_id(tx.last_insert_rowid()).map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(User {
                    id,
                    username: user.username,
                    password_hash: user.password_hash,
                })
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", username))
    }
}
