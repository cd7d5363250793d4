//! In-memory cache implementation with LRU eviction.
//!
//! Provides a thread-safe in-memory cache with TTL support using
//! tokio synchronization primitives and LRU eviction policy.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use repocache_core::cache::{pattern_matches, Cache, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Expired entries are removed lazily when they are read or when a
/// pattern deletion walks over them. Once `max_entries` is reached the
/// least recently used entry is evicted.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<Mutex<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache with LRU eviction.
    ///
    /// A `max_entries` of 0 is treated as 1.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Number of entries currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns true if a live entry exists for the key.
    pub async fn contains(&self, key: &str) -> bool {
        let store = self.store.lock().await;
        store
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(Instant::now()))
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.lock().await;

        let expired = match store.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            store.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.lock().await;
        store.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.lock().await.pop(key);
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        let mut store = self.store.lock().await;
        for key in keys {
            store.pop(key);
        }
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let mut store = self.store.lock().await;
        let now = Instant::now();

        let mut removed = 0;
        let doomed: Vec<(String, bool)> = store
            .iter()
            .filter(|(key, entry)| entry.is_expired(now) || pattern_matches(pattern, key))
            .map(|(key, entry)| (key.clone(), !entry.is_expired(now)))
            .collect();

        for (key, live) in doomed {
            store.pop(&key);
            if live {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Default max entries for tests
    const TEST_MAX_ENTRIES: usize = 1000;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("user:1", b"payload", None).await.unwrap();

        assert_eq!(
            cache.get("user:1").await.unwrap(),
            Some(b"payload".to_vec())
        );
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        assert_eq!(cache.get("user:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("user:1", b"old", None).await.unwrap();
        cache.set("user:1", b"new", None).await.unwrap();

        assert_eq!(cache.get("user:1").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("user:1", b"payload", None).await.unwrap();
        cache.delete("user:1").await.unwrap();

        assert!(!cache.contains("user:1").await);
        // Deleting again is a no-op
        cache.delete("user:1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_many() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        for key in ["user:1", "user:email:a@x.com", "user:username:a", "user:2"] {
            cache.set(key, b"v", None).await.unwrap();
        }

        cache
            .delete_many(&[
                "user:1".to_string(),
                "user:email:a@x.com".to_string(),
                "user:username:a".to_string(),
                "user:never-set".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.contains("user:2").await);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache
            .set("user:1", b"short lived", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert!(cache.get("user:1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(cache.get("user:1").await.unwrap().is_none());
        // Expired entry was removed on read
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_no_ttl_does_not_expire() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("user:1", b"forever", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(cache.contains("user:1").await);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(2);

        cache.set("a", b"1", None).await.unwrap();
        cache.set("b", b"2", None).await.unwrap();
        // Touch "a" so "b" becomes least recently used
        cache.get("a").await.unwrap();
        cache.set("c", b"3", None).await.unwrap();

        assert!(cache.contains("a").await);
        assert!(!cache.contains("b").await);
        assert!(cache.contains("c").await);
    }

    #[tokio::test]
    async fn test_zero_capacity_holds_one_entry() {
        let cache = MemoryCache::new(0);

        cache.set("a", b"1", None).await.unwrap();
        cache.set("b", b"2", None).await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.contains("b").await);
    }

    #[tokio::test]
    async fn test_delete_pattern() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        for key in ["user:1", "user:email:a@x.com", "tenant:1"] {
            cache.set(key, b"v", None).await.unwrap();
        }

        let removed = cache.delete_pattern("user:*").await.unwrap();

        assert_eq!(removed, 2);
        assert!(!cache.contains("user:1").await);
        assert!(!cache.contains("user:email:a@x.com").await);
        assert!(cache.contains("tenant:1").await);
    }

    #[tokio::test]
    async fn test_delete_pattern_does_not_count_expired_entries() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache
            .set("user:1", b"v", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        cache.set("user:2", b"v", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.delete_pattern("user:*").await.unwrap(), 1);
        assert!(cache.is_empty().await);
    }
}
