//! SQLite row conversion functions.

use bookshelf_core::auth::User;
use bookshelf_core::book::{Book, BookId};
use rusqlite::Row;

/// Converts a store id to the signed column type. Ids above `i64::MAX`
/// cannot exist in SQLite.
pub fn id_to_sql(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

fn id_from_sql(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    let raw: i64 = row.get(idx)?;
    u64::try_from(raw).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, raw))
}

/// Converts an inserted rowid to a store id.
pub fn rowid_to_id(rowid: i64) -> rusqlite::Result<BookId> {
    u64::try_from(rowid).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, rowid))
}

/// Convert a SQLite row to a Book.
///
/// Expected columns: id, title, author, image_path
pub fn row_to_book(row: &Row) -> rusqlite::Result<Book> {
    Ok(Book {
        id: id_from_sql(row, 0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        image_path: row.get(3)?,
    })
}

/// Convert a SQLite row to a User.
///
/// Expected columns: id, username, password_hash
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: id_from_sql(row, 0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
    })
}
