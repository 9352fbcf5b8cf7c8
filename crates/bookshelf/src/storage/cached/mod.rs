//! Cache-aside decorator over a [`BookStore`](bookshelf_core::storage::BookStore).
//!
//! - **Reads**: check the cache, fall through to the store on a miss or any
//!   cache failure, then repopulate
//! - **Writes**: persist to the store, then invalidate in the background
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let store = Arc::new(SqliteRepository::new("bookshelf.db").await?);
//! let cache = Arc::new(MemoryCache::new(10_000));
//!
//! let books = CachedBookRepository::new(store, cache, Duration::from_secs(600))
//!     .with_background_timeout(Duration::from_secs(5));
//! ```

mod background;
mod book;

pub use book::CachedBookRepository;
