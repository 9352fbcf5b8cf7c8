//! SQLite schema definitions and SQL query constants.

use bookshelf_core::book::BookFilters;
use rusqlite::types::Value;

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    author TEXT NOT NULL CHECK (length(trim(author)) > 0),
    image_path TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_books_author ON books(author);
CREATE INDEX IF NOT EXISTS idx_books_title ON books(title);
"#;

// Book queries
pub const SELECT_BOOKS: &str = "SELECT id, title, author, image_path FROM books";

pub const SELECT_BOOK_BY_ID: &str = r#"
SELECT id, title, author, image_path
FROM books
WHERE id = ?1
"#;

pub const INSERT_BOOK: &str = r#"
INSERT INTO books (title, author, image_path)
VALUES (?1, ?2, ?3)
"#;

pub const UPDATE_BOOK: &str = r#"
UPDATE books
SET title = ?2, author = ?3, image_path = ?4
WHERE id = ?1
"#;

pub const DELETE_BOOK: &str = r#"
DELETE FROM books
WHERE id = ?1
"#;

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (username, password_hash)
VALUES (?1, ?2)
"#;

pub const SELECT_USER_BY_USERNAME: &str = r#"
SELECT id, username, password_hash
FROM users
WHERE username = ?1
"#;

/// Builds the filtered, paged book listing query and its parameters.
///
/// Column names come from the closed `BookField` set; values are always
/// bound as parameters.
pub fn select_books_query(filters: &BookFilters, offset: u64, limit: u64) -> (String, Vec<Value>) {
    let mut sql = SELECT_BOOKS.to_string();
    let mut params = Vec::with_capacity(filters.len() + 2);

    for (i, (field, value)) in filters.iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        sql.push_str(field.as_str());
        sql.push_str(" = ?");
        params.push(Value::Text(value.to_string()));
    }

    sql.push_str(" ORDER BY id ASC LIMIT ? OFFSET ?");
    params.push(Value::Integer(to_sql_int(limit)));
    params.push(Value::Integer(to_sql_int(offset)));

    (sql, params)
}

/// SQLite integers are signed; larger values saturate.
fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
