//! Application state shared by every request handler.
//!
//! Book access always goes through the cache-aside repository; users are
//! read straight from the store. The backend pair is chosen by feature flags
//! (see `storage` and `cache` for the compile-time checks).

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::extract::FromRef;

use bookshelf_core::storage::{BookRepository, UserStore};

use crate::{auth::TokenIssuer, config::Config};

/// Shared application state.
///
/// Cloned for each request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Book repository (cached, wraps the underlying store).
    pub books: Arc<dyn BookRepository>,
    /// User store, read and written directly.
    pub users: Arc<dyn UserStore>,
    /// Access token signer and verifier.
    pub tokens: Arc<TokenIssuer>,
    /// Directory where uploaded cover images are written.
    pub upload_dir: PathBuf,
    /// Upper bound for a single request.
    pub request_timeout: Duration,
}

impl AppState {
    fn build(
        books: Arc<dyn BookRepository>,
        users: Arc<dyn UserStore>,
        config: &Config,
    ) -> Self {
        Self {
            books,
            users,
            tokens: Arc::new(TokenIssuer::new(&config.jwt_secret, config.token_ttl())),
            upload_dir: config.upload_dir.clone(),
            request_timeout: config.request_timeout(),
        }
    }
}

impl FromRef<AppState> for Arc<TokenIssuer> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

// ============================================================================
// Factory functions for different backend combinations
// ============================================================================

#[cfg(all(feature = "sqlite", feature = "memory"))]
mod sqlite_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::{CachedBookRepository, SqliteRepository};

    impl AppState {
        /// Creates AppState with SQLite storage and in-memory cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let sqlite_repo = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            let memory_cache = Arc::new(MemoryCache::new(config.cache_max_entries));

            let cached_book_repo = Arc::new(
                CachedBookRepository::new(sqlite_repo.clone(), memory_cache, config.cache_ttl())
                    .with_background_timeout(config.cache_background_timeout()),
            );

            Ok(Self::build(cached_book_repo, sqlite_repo, config))
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "redis"))]
mod sqlite_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::storage::{CachedBookRepository, SqliteRepository};

    impl AppState {
        /// Creates AppState with SQLite storage and Redis cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let sqlite_repo = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            let redis_cache = Arc::new(RedisCache::new(&config.redis_url).await?);

            let cached_book_repo = Arc::new(
                CachedBookRepository::new(sqlite_repo.clone(), redis_cache, config.cache_ttl())
                    .with_background_timeout(config.cache_background_timeout()),
            );

            Ok(Self::build(cached_book_repo, sqlite_repo, config))
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "memory"))]
mod inmemory_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::{CachedBookRepository, InMemoryRepository};

    impl AppState {
        /// Creates AppState with in-memory storage and cache.
        /// Useful for local runs without any external dependencies.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let inmemory_repo = Arc::new(InMemoryRepository::new());
            let memory_cache = Arc::new(MemoryCache::new(config.cache_max_entries));

            let cached_book_repo = Arc::new(
                CachedBookRepository::new(inmemory_repo.clone(), memory_cache, config.cache_ttl())
                    .with_background_timeout(config.cache_background_timeout()),
            );

            Ok(Self::build(cached_book_repo, inmemory_repo, config))
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "redis"))]
mod inmemory_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::storage::{CachedBookRepository, InMemoryRepository};

    impl AppState {
        /// Creates AppState with in-memory storage and Redis cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let inmemory_repo = Arc::new(InMemoryRepository::new());
            let redis_cache = Arc::new(RedisCache::new(&config.redis_url).await?);

            let cached_book_repo = Arc::new(
                CachedBookRepository::new(inmemory_repo.clone(), redis_cache, config.cache_ttl())
                    .with_background_timeout(config.cache_background_timeout()),
            );

            Ok(Self::build(cached_book_repo, inmemory_repo, config))
        }
    }
}

// ============================================================================
// Test support - provides Default implementation for unit tests
// ============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    use std::collections::{BTreeMap, HashMap};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    use bookshelf_core::auth::{NewUser, User};
    use bookshelf_core::book::{Book, BookFilters, BookId, NewBook};
    use bookshelf_core::cache::{self, Cache};
    use bookshelf_core::storage::{BookMutation, BookStore, RepositoryError, Result};

    use crate::storage::CachedBookRepository;

    /// Minimal store for router tests, independent of the enabled backend.
    #[derive(Debug, Default)]
    pub(crate) struct TestStore {
        books: RwLock<BTreeMap<BookId, Book>>,
        users: RwLock<HashMap<String, User>>,
    }

    #[async_trait]
    impl BookStore for TestStore {
        async fn find_books(
            &self,
            filters: &BookFilters,
            offset: u64,
            limit: u64,
        ) -> Result<Vec<Book>> {
            let books = self.books.read().await;
            Ok(books
                .values()
                .filter(|book| filters.matches(book))
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn find_book(&self, id: BookId) -> Result<Option<Book>> {
            Ok(self.books.read().await.get(&id).cloned())
        }

        async fn insert_book(&self, book: &NewBook) -> Result<Book> {
            let mut books = self.books.write().await;
            let id = books.keys().next_back().map_or(1, |last| last + 1);
            let book = book.clone().into_book(id);
            books.insert(id, book.clone());
            Ok(book)
        }

        async fn update_book(&self, id: BookId, mutation: BookMutation) -> Result<Option<Book>> {
            let mut books = self.books.write().await;
            Ok(books.get_mut(&id).map(|book| {
                mutation(book);
                book.clone()
            }))
        }

        async fn delete_book(&self, id: BookId) -> Result<()> {
            self.books.write().await.remove(&id);
            Ok(())
        }
    }

    #[async_trait]
    impl UserStore for TestStore {
        async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
            Ok(self.users.read().await.get(username).cloned())
        }

        async fn insert_user(&self, user: &NewUser) -> Result<User> {
            let mut users = self.users.write().await;
            if users.contains_key(&user.username) {
                return Err(RepositoryError::AlreadyExists {
                    entity_type: "User",
                    id: user.username.clone(),
                });
            }
            let user = User {
                id: users.len() as u64 + 1,
                username: user.username.clone(),
                password_hash: user.password_hash.clone(),
            };
            users.insert(user.username.clone(), user.clone());
            Ok(user)
        }
    }

    /// Cache that never holds anything, so router tests read the store
    /// without racing detached invalidation.
    #[derive(Debug, Default)]
    pub(crate) struct NullCache;

    #[async_trait]
    impl Cache for NullCache {
        async fn get(&self, _key: &str) -> cache::Result<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn set(
            &self,
            _key: &str,
            _value: &[u8],
            _ttl: Option<Duration>,
        ) -> cache::Result<()> {
            Ok(())
        }

        async fn delete(&self, _key: &str) -> cache::Result<()> {
            Ok(())
        }

        async fn delete_pattern(&self, _pattern: &str) -> cache::Result<()> {
            Ok(())
        }
    }

    impl Default for AppState {
        fn default() -> Self {
            let store = Arc::new(TestStore::default());
            let books = Arc::new(CachedBookRepository::new(
                store.clone(),
                Arc::new(NullCache),
                Duration::from_secs(60),
            ));

            Self {
                books,
                users: store,
                tokens: Arc::new(TokenIssuer::new(
                    "test-secret",
                    chrono::Duration::hours(1),
                )),
                upload_dir: std::env::temp_dir().join(format!("bookshelf-test-{}", Uuid::new_v4())),
                request_timeout: Duration::from_secs(10),
            }
        }
    }
}
