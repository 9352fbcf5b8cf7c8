//! Cached book repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use bookshelf_core::book::{
    validate_image_path, validate_new_book, validate_patch, Book, BookFilters, BookId, BookPatch,
    NewBook,
};
use bookshelf_core::cache::{
    book_generation_key, book_key, books_list_generation_key, books_list_key,
    books_list_pattern, deserialize_book, deserialize_books, serialize_book, serialize_books,
    Cache, Result as CacheResult, SerializationError,
};
use bookshelf_core::storage::{
    image_mutation, patch_mutation, BookRepository, BookStore, Pagination, RepositoryError,
    Result,
};
use uuid::Uuid;

use super::background::spawn_detached;

/// Budget for detached cache work when none is configured.
pub const DEFAULT_BACKGROUND_TIMEOUT: Duration = Duration::from_secs(5);

/// Last invalidation marker seen for a key family; `None` if never written.
type Generation = Option<Vec<u8>>;

/// Book repository implementing cache-aside over a [`BookStore`].
///
/// Listing reads repopulate the cache before returning. Single-book reads
/// populate it in a detached task. Every successful write drops all cached
/// listings in a detached task; updates and deletes also drop the book's
/// own entry.
///
/// Writers replace a generation marker before deleting entries, and readers
/// capture it before reading the store. A population whose marker moved in
/// the meantime is deleted again, so a snapshot read before a write never
/// outlives that write's invalidation.
///
/// # Type Parameters
///
/// * `S` - The authoritative store
/// * `C` - The cache implementation
pub struct CachedBookRepository<S, C>
where
    S: BookStore,
    C: Cache,
{
    store: Arc<S>,
    cache: Arc<C>,
    ttl: Duration,
    background_timeout: Duration,
}

impl<S, C> CachedBookRepository<S, C>
where
    S: BookStore,
    C: Cache + 'static,
{
    /// Creates a cached repository whose entries live for `ttl`.
    pub fn new(store: Arc<S>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            store,
            cache,
            ttl,
            background_timeout: DEFAULT_BACKGROUND_TIMEOUT,
        }
    }

    /// Sets how long detached cache work may run before it is abandoned.
    pub fn with_background_timeout(mut self, timeout: Duration) -> Self {
        self.background_timeout = timeout;
        self
    }

    /// Reads and decodes a cached value. Any failure counts as a miss.
    async fn read_cached<T>(
        &self,
        key: &str,
        decode: fn(&[u8]) -> std::result::Result<T, SerializationError>,
    ) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(value) => {
                    tracing::trace!(key, "Cache hit");
                    return Some(value);
                }
                Err(err) => tracing::warn!(key, error = %err, "Cached value is unreadable"),
            },
            Ok(None) => {}
            Err(err) => tracing::warn!(key, error = %err, "Cache read failed"),
        }
        tracing::trace!(key, "Cache miss");
        None
    }

    /// Reads the generation marker at `key` ahead of a store read.
    ///
    /// Returns `None` when the cache cannot answer, in which case nothing
    /// read afterwards may be cached.
    async fn read_generation(&self, key: &str) -> Option<Generation> {
        match self.cache.get(key).await {
            Ok(generation) => Some(generation),
            Err(err) => {
                tracing::debug!(key, error = %err, "Generation unavailable, skipping population");
                None
            }
        }
    }

    /// Populates `key` in the background.
    fn populate_detached(
        &self,
        key: String,
        bytes: Vec<u8>,
        generation_key: String,
        seen: Generation,
    ) {
        let cache = Arc::clone(&self.cache);
        let ttl = self.ttl;
        spawn_detached("populate_book", self.background_timeout, async move {
            populate_guarded(cache.as_ref(), &key, &bytes, ttl, &generation_key, seen).await
        });
    }

    /// Drops every cached listing and, when `id` is given, that book's entry.
    ///
    /// Generations are replaced first so populations already in flight
    /// notice the write.
    fn invalidate_detached(&self, id: Option<BookId>) {
        let cache = Arc::clone(&self.cache);
        let generation_ttl = self.ttl.max(self.background_timeout);
        spawn_detached("invalidate_books", self.background_timeout, async move {
            let generation = Uuid::new_v4().to_string();
            let marker = generation.as_bytes();
            let by_id = match id {
                Some(id) => {
                    let bumped = cache
                        .set(&book_generation_key(id), marker, Some(generation_ttl))
                        .await;
                    let deleted = cache.delete(&book_key(id)).await;
                    bumped.and(deleted)
                }
                None => Ok(()),
            };
            let bumped = cache
                .set(&books_list_generation_key(), marker, Some(generation_ttl))
                .await;
            let lists = cache.delete_pattern(&books_list_pattern()).await;
            by_id.and(bumped).and(lists)
        });
    }
}

/// Writes `bytes` under `key`, then deletes it again if the generation at
/// `generation_key` is no longer `seen`.
async fn populate_guarded<C: Cache + ?Sized>(
    cache: &C,
    key: &str,
    bytes: &[u8],
    ttl: Duration,
    generation_key: &str,
    seen: Generation,
) -> CacheResult<()> {
    cache.set(key, bytes, Some(ttl)).await?;

    match cache.get(generation_key).await {
        Ok(current) if current == seen => Ok(()),
        Ok(_) => {
            tracing::debug!(key, "Invalidated while populating, dropping entry");
            cache.delete(key).await
        }
        Err(err) => {
            let _ = cache.delete(key).await;
            Err(err)
        }
    }
}

/// Treats a store "not found" as an absent row.
fn absent_on_not_found<T: Default>(result: Result<T>) -> Result<T> {
    match result {
        Err(err) if err.is_not_found() => Ok(T::default()),
        other => other,
    }
}

#[async_trait]
impl<S, C> BookRepository for CachedBookRepository<S, C>
where
    S: BookStore + 'static,
    C: Cache + 'static,
{
    async fn list_books(&self, filters: &BookFilters, page: Pagination) -> Result<Vec<Book>> {
        let cache_key = books_list_key(filters, page);

        if let Some(books) = self.read_cached(&cache_key, deserialize_books).await {
            return Ok(books);
        }

        let generation_key = books_list_generation_key();
        let generation = self.read_generation(&generation_key).await;

        let books = absent_on_not_found(
            self.store
                .find_books(filters, page.offset(), page.limit())
                .await,
        )?;

        if let Some(seen) = generation {
            match serialize_books(&books) {
                Ok(bytes) => {
                    let populated = populate_guarded(
                        self.cache.as_ref(),
                        &cache_key,
                        &bytes,
                        self.ttl,
                        &generation_key,
                        seen,
                    )
                    .await;
                    if let Err(err) = populated {
                        tracing::warn!(key = %cache_key, error = %err, "Failed to cache book list");
                    }
                }
                Err(err) => tracing::warn!(error = %err, "Failed to encode book list"),
            }
        }

        Ok(books)
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>> {
        let cache_key = book_key(id);

        if let Some(book) = self.read_cached(&cache_key, deserialize_book).await {
            return Ok(Some(book));
        }

        let generation_key = book_generation_key(id);
        let generation = self.read_generation(&generation_key).await;

        let book = absent_on_not_found(self.store.find_book(id).await)?;

        if let (Some(book), Some(seen)) = (&book, generation) {
            match serialize_book(book) {
                Ok(bytes) => self.populate_detached(cache_key, bytes, generation_key, seen),
                Err(err) => tracing::warn!(book_id = id, error = %err, "Failed to encode book"),
            }
        }

        Ok(book)
    }

    async fn create_book(&self, book: &NewBook) -> Result<Book> {
        validate_new_book(book)?;

        let created = self.store.insert_book(book).await?;
        self.invalidate_detached(None);

        tracing::debug!(book_id = created.id, "Book created");
        Ok(created)
    }

    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Option<Book>> {
        validate_patch(patch)?;

        let updated = absent_on_not_found(self.store.update_book(id, patch_mutation(patch)).await)?;

        if updated.is_some() {
            self.invalidate_detached(Some(id));
            tracing::debug!(book_id = id, "Book updated");
        }
        Ok(updated)
    }

    async fn update_book_image(&self, id: BookId, image_path: &str) -> Result<Option<Book>> {
        validate_image_path(image_path)?;

        let updated =
            absent_on_not_found(self.store.update_book(id, image_mutation(image_path)).await)?;

        if updated.is_some() {
            self.invalidate_detached(Some(id));
            tracing::debug!(book_id = id, image_path, "Book image updated");
        }
        Ok(updated)
    }

    async fn delete_book(&self, id: BookId) -> Result<()> {
        match self.store.delete_book(id).await {
            Ok(()) => {}
            Err(RepositoryError::NotFound { .. }) => {}
            Err(err) => return Err(err),
        }

        self.invalidate_detached(Some(id));
        tracing::debug!(book_id = id, "Book deleted");
        Ok(())
    }
}
