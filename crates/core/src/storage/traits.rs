use async_trait::async_trait;

use crate::auth::{NewUser, User};
use crate::book::{Book, BookFilters, BookId, BookPatch, NewBook};

use super::{Pagination, Result};

/// A change applied to a loaded book inside a store transaction.
pub type BookMutation = Box<dyn FnOnce(&mut Book) + Send + 'static>;

/// Caller-facing book operations.
///
/// Implementations decide how reads are served (directly from a store, or
/// through a cache); callers only see the catalog.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Lists books matching every filter, one page at a time, ordered by id.
    async fn list_books(&self, filters: &BookFilters, page: Pagination) -> Result<Vec<Book>>;

    /// Gets a book by id. An unknown id is `Ok(None)`.
    async fn get_book(&self, id: BookId) -> Result<Option<Book>>;

    /// Validates and persists a new book, returning it with its assigned id.
    async fn create_book(&self, book: &NewBook) -> Result<Book>;

    /// Applies `patch` to the book. `Ok(None)` when the id does not exist.
    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Option<Book>>;

    /// Replaces only the cover image path. `Ok(None)` when the id does not exist.
    async fn update_book_image(&self, id: BookId, image_path: &str) -> Result<Option<Book>>;

    /// Deletes a book. Deleting an unknown id succeeds.
    async fn delete_book(&self, id: BookId) -> Result<()>;
}

/// The authoritative book store.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Finds books matching every filter, ordered by id ascending.
    async fn find_books(&self, filters: &BookFilters, offset: u64, limit: u64)
        -> Result<Vec<Book>>;

    /// Finds a book by id.
    async fn find_book(&self, id: BookId) -> Result<Option<Book>>;

    /// Inserts a book atomically and returns it with the assigned id.
    async fn insert_book(&self, book: &NewBook) -> Result<Book>;

    /// Loads the book, applies `mutation` and persists the result in a
    /// single transaction. Returns `Ok(None)` without writing when the id
    /// does not exist.
    async fn update_book(&self, id: BookId, mutation: BookMutation) -> Result<Option<Book>>;

    /// Deletes a book. A missing id is a no-op.
    async fn delete_book(&self, id: BookId) -> Result<()>;
}

/// Persistence for registered users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by username.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Inserts a user. Fails with `AlreadyExists` when the username is taken.
    async fn insert_user(&self, user: &NewUser) -> Result<User>;
}

/// Builds the store mutation that applies `patch`.
pub fn patch_mutation(patch: &BookPatch) -> BookMutation {
    let patch = patch.clone();
    Box::new(move |book: &mut Book| patch.apply_to(book))
}

/// Builds the store mutation that replaces only the image path.
pub fn image_mutation(image_path: &str) -> BookMutation {
    let image_path = image_path.to_string();
    Box::new(move |book: &mut Book| book.image_path = image_path)
}
