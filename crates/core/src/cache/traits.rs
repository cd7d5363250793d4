use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::Result;

/// Trait for cache backend operations.
///
/// Implementations report every failure; the fail-soft policy lives one
/// layer up, in the key-value store that wraps the backend.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes several keys. Backends with a native batch command override this.
    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(())
    }

    /// Deletes all values matching a glob pattern (e.g., `"user:*"`).
    /// Returns the number of keys removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64>;
}

/// Cache key derivation for one entity type.
///
/// `all_keys_for` must list every key that could resolve to the entity,
/// otherwise writes leave stale entries behind.
pub trait CacheKeys<T>: Send + Sync {
    /// Primary key-by-id.
    fn key_by_id(&self, id: Uuid) -> String;

    /// Key for a lookup by natural key (e.g. `email`). Must be
    /// case-insensitive in `value`.
    fn key_by_natural(&self, field: &str, value: &str) -> String;

    /// Every key (id and natural keys) referencing this entity.
    fn all_keys_for(&self, entity: &T) -> Vec<String>;
}
