//! Fail-soft key-value store over a cache backend.
//!
//! Every backend call runs under a timeout. Failures and timeouts are
//! logged and counted, then reported to the caller as a miss (for reads) or
//! silently dropped (for writes). Nothing here returns an error: a degraded
//! cache only costs latency.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use repocache_core::cache::{Cache, CacheCodec, CacheError, CacheMetrics, Result};

/// Default per-call timeout for backend operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);

/// Key-value store that never propagates backend failures.
pub struct KeyValueStore<C: ?Sized> {
    backend: Arc<C>,
    metrics: Arc<CacheMetrics>,
    timeout: Duration,
}

impl<C: ?Sized> Clone for KeyValueStore<C> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            metrics: Arc::clone(&self.metrics),
            timeout: self.timeout,
        }
    }
}

impl<C> KeyValueStore<C>
where
    C: Cache + ?Sized,
{
    /// Creates a store over `backend` reporting into `metrics`.
    pub fn new(backend: Arc<C>, metrics: Arc<CacheMetrics>) -> Self {
        Self {
            backend,
            metrics,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the per-call backend timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Counters shared with every decorator using this store.
    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    /// The raw, fallible backend.
    pub fn backend(&self) -> &Arc<C> {
        &self.backend
    }

    /// Reads a key. Backend faults are reported as `None`.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.guarded("get", key, self.backend.get(key))
            .await
            .flatten()
    }

    /// Writes a key with a TTL. Best-effort.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Duration) {
        if self
            .guarded("set", key, self.backend.set(key, value, Some(ttl)))
            .await
            .is_some()
        {
            if CacheCodec::is_compressed(value) {
                self.metrics.record_compressed_set();
            } else {
                self.metrics.record_set();
            }
            tracing::debug!(key = %key, size_bytes = value.len(), ttl = ?ttl, "Cache set");
        }
    }

    /// Removes a key. Best-effort.
    pub async fn delete(&self, key: &str) {
        if self
            .guarded("delete", key, self.backend.delete(key))
            .await
            .is_some()
        {
            self.metrics.record_delete();
            tracing::debug!(key = %key, "Cache delete");
        }
    }

    /// Removes several keys in one backend call. Best-effort.
    pub async fn delete_many(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        let target = keys.join(",");
        if self
            .guarded("delete_many", &target, self.backend.delete_many(keys))
            .await
            .is_some()
        {
            for _ in keys {
                self.metrics.record_delete();
            }
            tracing::debug!(keys = %target, "Cache invalidated");
        }
    }

    /// Removes every key matching a glob pattern. Returns how many were
    /// removed (0 when the backend failed).
    pub async fn clear_pattern(&self, pattern: &str) -> u64 {
        let removed = self
            .guarded("clear_pattern", pattern, self.backend.delete_pattern(pattern))
            .await
            .unwrap_or(0);
        for _ in 0..removed {
            self.metrics.record_delete();
        }
        removed
    }

    async fn guarded<T, F>(&self, operation: &'static str, target: &str, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.timeout)),
        };

        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.metrics.record_error();
                tracing::warn!(operation, key = %target, error = %err, "Cache operation failed");
                None
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FailingCache, HangingCache, MockCache};
    use super::*;
    use repocache_core::cache::{CacheMetricsSnapshot, TAG_RAW, TAG_ZSTD};

    fn mock_store() -> KeyValueStore<MockCache> {
        KeyValueStore::new(Arc::new(MockCache::new()), Arc::new(CacheMetrics::new()))
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = mock_store();

        store.set("user:1", &[TAG_RAW, b'{', b'}'], Duration::from_secs(60)).await;
        assert_eq!(store.get("user:1").await, Some(vec![TAG_RAW, b'{', b'}']));

        store.delete("user:1").await;
        assert_eq!(store.get("user:1").await, None);

        let snapshot = store.metrics().snapshot();
        assert_eq!(snapshot.sets, 1);
        assert_eq!(snapshot.deletes, 1);
        assert_eq!(snapshot.errors, 0);
    }

    #[tokio::test]
    async fn test_compressed_set_is_counted() {
        let store = mock_store();

        store.set("user:1", &[TAG_ZSTD, 0x28], Duration::from_secs(60)).await;

        let snapshot = store.metrics().snapshot();
        assert_eq!(snapshot.sets, 1);
        assert_eq!(snapshot.compressed_sets, 1);
    }

    #[tokio::test]
    async fn test_delete_many_counts_every_key() {
        let store = mock_store();
        let keys = vec!["user:1".to_string(), "user:email:a@x.com".to_string()];
        for key in &keys {
            store.set(key, b"\x00{}", Duration::from_secs(60)).await;
        }

        store.delete_many(&keys).await;

        assert_eq!(store.backend().len().await, 0);
        assert_eq!(store.metrics().snapshot().deletes, 2);
    }

    #[tokio::test]
    async fn test_delete_many_empty_is_noop() {
        let store = mock_store();
        store.delete_many(&[]).await;
        assert_eq!(store.metrics().snapshot(), CacheMetricsSnapshot::default());
    }

    #[tokio::test]
    async fn test_clear_pattern() {
        let store = mock_store();
        for key in ["user:1", "user:2", "tenant:1"] {
            store.set(key, b"\x00{}", Duration::from_secs(60)).await;
        }

        assert_eq!(store.clear_pattern("user:*").await, 2);
        assert!(store.backend().contains("tenant:1").await);
        assert_eq!(store.metrics().snapshot().deletes, 2);
    }

    #[tokio::test]
    async fn test_backend_errors_are_absorbed() {
        let store = KeyValueStore::new(Arc::new(FailingCache::new()), Arc::new(CacheMetrics::new()));

        assert_eq!(store.get("user:1").await, None);
        store.set("user:1", b"\x00{}", Duration::from_secs(60)).await;
        store.delete("user:1").await;
        store.delete_many(&["user:1".to_string()]).await;
        assert_eq!(store.clear_pattern("user:*").await, 0);

        let snapshot = store.metrics().snapshot();
        assert_eq!(snapshot.errors, 5);
        assert_eq!(snapshot.sets, 0);
        assert_eq!(snapshot.deletes, 0);
    }

    #[tokio::test]
    async fn test_recovers_after_backend_heals() {
        let backend = Arc::new(FailingCache::new());
        let store = KeyValueStore::new(backend.clone(), Arc::new(CacheMetrics::new()));

        store.set("user:1", b"\x00{}", Duration::from_secs(60)).await;
        backend.heal();
        store.set("user:1", b"\x00{}", Duration::from_secs(60)).await;

        assert!(store.get("user:1").await.is_some());
        assert_eq!(store.metrics().snapshot().errors, 1);
    }

    #[tokio::test]
    async fn test_timeout_is_treated_as_miss() {
        let store = KeyValueStore::new(Arc::new(HangingCache), Arc::new(CacheMetrics::new()))
            .with_timeout(Duration::from_millis(10));

        assert_eq!(store.get("user:1").await, None);
        store.set("user:1", b"\x00{}", Duration::from_secs(60)).await;

        assert_eq!(store.metrics().snapshot().errors, 2);
    }

    #[tokio::test]
    async fn test_works_over_trait_object() {
        let backend: Arc<dyn Cache> = Arc::new(MockCache::new());
        let store = KeyValueStore::new(backend, Arc::new(CacheMetrics::new()));

        store.set("user:1", b"\x00{}", Duration::from_secs(60)).await;
        assert!(store.get("user:1").await.is_some());
    }
}
