//! In-memory repository implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use bookshelf_core::auth::{NewUser, User, UserId};
use bookshelf_core::book::{Book, BookFilters, BookId, NewBook};
use bookshelf_core::storage::{BookMutation, BookStore, RepositoryError, Result, UserStore};

#[derive(Debug)]
struct BookTable {
    rows: BTreeMap<BookId, Book>,
    next_id: BookId,
}

#[derive(Debug)]
struct UserTable {
    rows: HashMap<String, User>,
    next_id: UserId,
}

/// In-memory storage backend.
///
/// Ids are assigned from 1 upwards and never reused, like SQLite's
/// AUTOINCREMENT. Each write holds the table's write lock for its whole
/// read-modify-write, so writes are atomic with respect to each other.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    books: Arc<RwLock<BookTable>>,
    users: Arc<RwLock<UserTable>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            books: Arc::new(RwLock::new(BookTable {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
            users: Arc::new(RwLock::new(UserTable {
                rows: HashMap::new(),
                next_id: 1,
            })),
        }
    }
}

#[async_trait]
impl BookStore for InMemoryRepository {
    async fn find_books(
        &self,
        filters: &BookFilters,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Book>> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);

        let books = self.books.read().await;
        Ok(books
            .rows
            .values()
            .filter(|book| filters.matches(book))
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn find_book(&self, id: BookId) -> Result<Option<Book>> {
        let books = self.books.read().await;
        Ok(books.rows.get(&id).cloned())
    }

    async fn insert_book(&self, book: &NewBook) -> Result<Book> {
        let mut books = self.books.write().await;
        let id = books.next_id;
        books.next_id = id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::QueryFailed("Book ids exhausted".to_string()))?;

        let book = book.clone().into_book(id);
        books.rows.insert(id, book.clone());
        Ok(book)
    }

    async fn update_book(&self, id: BookId, mutation: BookMutation) -> Result<Option<Book>> {
        let mut books = self.books.write().await;
        let Some(current) = books.rows.get(&id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        mutation(&mut updated);
        updated.id = id;

        books.rows.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_book(&self, id: BookId) -> Result<()> {
        let mut books = self.books.write().await;
        books.rows.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.rows.get(username).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.rows.contains_key(&user.username) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.username.clone(),
            });
        }

        let id = users.next_id;
        users.next_id += 1;

        let user = User {
            id,
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
        };
        users.rows.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}
