//! Redis cache implementation.
//!
//! Listing keys are recorded in a tracking set as they are written, so the
//! listing namespace can be dropped without a SCAN over the keyspace.
//!
//! A listing value and its tracking entry are written in one MULTI/EXEC
//! block, and the tracking set takes the entry's TTL so it never outlives
//! what it tracks. Every entry is written with the same TTL, so the latest
//! write covers the remaining lifetime of earlier members.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use bookshelf_core::cache::{
    books_list_pattern, books_list_tracking_key, pattern_matches, Cache, Result,
};

use super::error::map_redis_error;

/// Keys removed per MULTI/EXEC block during pattern deletion.
const DELETE_BATCH_SIZE: usize = 500;

/// Redis cache backend using a connection manager for reconnects.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
    list_pattern: String,
    tracking_key: String,
}

impl RedisCache {
    /// Connects to Redis at `url` (e.g. "redis://localhost:6379").
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self {
            conn,
            list_pattern: books_list_pattern(),
            tracking_key: books_list_tracking_key(),
        })
    }

    fn is_list_key(&self, key: &str) -> bool {
        pattern_matches(&self.list_pattern, key)
    }

    /// A pattern can be served from the tracking set when everything it
    /// matches lives in the listing namespace.
    fn is_list_pattern(&self, pattern: &str) -> bool {
        let prefix = self.list_pattern.trim_end_matches('*');
        pattern.starts_with(prefix)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects zero
        let seconds = ttl.map(|duration| duration.as_secs().max(1));

        let mut pipe = redis::pipe();
        pipe.atomic();
        match seconds {
            Some(seconds) => pipe.set_ex(key, value, seconds).ignore(),
            None => pipe.set(key, value).ignore(),
        };

        if self.is_list_key(key) {
            pipe.sadd(&self.tracking_key, key).ignore();
            match seconds {
                Some(seconds) => pipe.expire(&self.tracking_key, seconds as i64).ignore(),
                None => pipe.persist(&self.tracking_key).ignore(),
            };
        }

        let (): () = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        let mut pipe = redis::pipe();
        pipe.atomic().del(key).ignore();
        if self.is_list_key(key) {
            pipe.srem(&self.tracking_key, key).ignore();
        }

        let (): () = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        if !self.is_list_pattern(pattern) {
            tracing::debug!(pattern, "Pattern outside tracked namespace, nothing to delete");
            return Ok(());
        }

        let mut conn = self.conn.clone();

        let tracked_keys: Vec<String> = conn
            .smembers(&self.tracking_key)
            .await
            .map_err(map_redis_error)?;

        let keys_to_delete: Vec<&String> = tracked_keys
            .iter()
            .filter(|k| pattern_matches(pattern, k))
            .collect();

        for batch in keys_to_delete.chunks(DELETE_BATCH_SIZE) {
            let mut pipe = redis::pipe();
            pipe.atomic()
                .del(batch)
                .ignore()
                .srem(&self.tracking_key, batch)
                .ignore();
            let (): () = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
        }

        tracing::trace!(pattern, deleted = keys_to_delete.len(), "Deleted keys by pattern");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::book::{BookField, BookFilters};
    use bookshelf_core::cache::{book_key, books_list_key};
    use bookshelf_core::storage::Pagination;
    use uuid::Uuid;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Returns `None` when no Redis server is reachable.
    async fn get_test_cache() -> Option<RedisCache> {
        RedisCache::new(&redis_url()).await.ok()
    }

    /// Unique filter value so concurrent tests never share listing keys.
    fn unique_filters() -> BookFilters {
        BookFilters::new().with(BookField::Author, Uuid::new_v4().to_string())
    }

    #[tokio::test]
    async fn test_redis_set_get_delete() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = format!("test:redis_cache:{}", Uuid::new_v4());

        cache.set(&key, b"hello world", None).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(b"hello world".to_vec()));

        cache.delete(&key).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_ttl() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = format!("test:redis_cache:ttl:{}", Uuid::new_v4());

        cache
            .set(&key, b"expiring", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_list_keys_are_tracked() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = books_list_key(&unique_filters(), Pagination::default());
        cache.set(&key, b"[]", None).await.unwrap();

        let mut conn = cache.conn.clone();
        let tracked: bool = conn.sismember(&cache.tracking_key, &key).await.unwrap();
        assert!(tracked);

        cache.delete(&key).await.unwrap();
        let tracked: bool = conn.sismember(&cache.tracking_key, &key).await.unwrap();
        assert!(!tracked);
    }

    #[tokio::test]
    async fn test_redis_tracking_set_expires_with_entries() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = books_list_key(&unique_filters(), Pagination::default());
        cache
            .set(&key, b"[]", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        let mut conn = cache.conn.clone();
        let tracked: bool = conn.sismember(&cache.tracking_key, &key).await.unwrap();
        assert!(tracked);
        let ttl: i64 = conn.ttl(&cache.tracking_key).await.unwrap();
        assert!(ttl > 0 && ttl <= 60, "tracking set ttl was {ttl}");

        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_delete_list_pattern() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let filters = unique_filters();
        let page1 = books_list_key(&filters, Pagination::new(1, 10).unwrap());
        let page2 = books_list_key(&filters, Pagination::new(2, 10).unwrap());
        let book = book_key(u64::MAX - 7);

        cache.set(&page1, b"[]", None).await.unwrap();
        cache.set(&page2, b"[]", None).await.unwrap();
        cache.set(&book, b"{}", None).await.unwrap();

        cache.delete_pattern(&books_list_pattern()).await.unwrap();

        assert!(cache.get(&page1).await.unwrap().is_none());
        assert!(cache.get(&page2).await.unwrap().is_none());
        assert!(cache.get(&book).await.unwrap().is_some());

        cache.delete(&book).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_untracked_pattern_is_noop() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let book = book_key(u64::MAX - 8);
        cache.set(&book, b"{}", None).await.unwrap();

        cache.delete_pattern("bookshelf:v1:book:*").await.unwrap();

        assert!(cache.get(&book).await.unwrap().is_some());
        cache.delete(&book).await.unwrap();
    }
}
