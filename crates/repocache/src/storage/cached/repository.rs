//! Generic cached repository decorator.
//!
//! Wraps any [`Repository`] with the cache-aside pattern. Key derivation is
//! supplied by a [`CacheKeys`] implementation so one decorator serves every
//! entity type.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use repocache_core::cache::{Cache, CacheCodec, CacheKeys};
use repocache_core::storage::{Entity, PageRequest, Repository, Result};

use crate::cache::KeyValueStore;

/// Cached repository decorator.
///
/// Implements the cache-aside pattern:
/// - **Reads**: Check cache first, on miss fetch from repository and populate cache
/// - **Writes**: Persist to repository, then invalidate every key of the entity
///
/// Only single-entity lookups are cached. Listings, searches and counts go
/// straight to the repository. Soft-deleted entities are never cached, and
/// reads with `include_deleted` bypass the cache.
///
/// Cache faults never surface: the [`KeyValueStore`] absorbs them and a bad
/// payload is treated as a miss. Repository errors propagate unchanged.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation
/// * `K` - The cache key scheme for `R::Entity`
pub struct CachedRepository<R, C, K>
where
    R: Repository,
    C: Cache + ?Sized,
    K: CacheKeys<R::Entity>,
{
    repository: Arc<R>,
    store: KeyValueStore<C>,
    codec: CacheCodec,
    keys: K,
    ttl: Duration,
}

impl<R, C, K> CachedRepository<R, C, K>
where
    R: Repository,
    C: Cache + ?Sized,
    K: CacheKeys<R::Entity>,
{
    /// Creates a new cached repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - The underlying repository to cache
    /// * `store` - Fail-soft store over the cache backend
    /// * `keys` - Key scheme for the entity type
    /// * `ttl` - Time-to-live for cached entities
    pub fn new(repository: Arc<R>, store: KeyValueStore<C>, keys: K, ttl: Duration) -> Self {
        Self {
            repository,
            store,
            codec: CacheCodec::default(),
            keys,
            ttl,
        }
    }

    /// Replaces the payload codec.
    pub fn with_codec(mut self, codec: CacheCodec) -> Self {
        self.codec = codec;
        self
    }

    /// The wrapped repository.
    pub fn inner(&self) -> &Arc<R> {
        &self.repository
    }

    /// The fail-soft store backing this decorator.
    pub fn store(&self) -> &KeyValueStore<C> {
        &self.store
    }

    /// The key scheme used for derivation and invalidation.
    pub fn keys(&self) -> &K {
        &self.keys
    }

    /// Cache-aside lookup by a natural key such as `email`.
    ///
    /// The key is case-insensitive in `value`. `fetch` is only called on a
    /// miss.
    pub async fn get_by_natural_key<F, Fut>(
        &self,
        field: &str,
        value: &str,
        fetch: F,
    ) -> Result<Option<R::Entity>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<R::Entity>>>,
    {
        let key = self.keys.key_by_natural(field, value);
        self.read_through(&key, fetch).await
    }

    /// Soft-deletes an entity the caller already holds, invalidating its
    /// keys without a lookup.
    pub async fn delete_entity(&self, entity: &R::Entity) -> Result<bool> {
        let deleted = self.repository.delete(entity.id()).await?;
        if deleted {
            self.invalidate(entity).await;
        }
        Ok(deleted)
    }

    async fn read_through<F, Fut>(&self, key: &str, fetch: F) -> Result<Option<R::Entity>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<R::Entity>>>,
    {
        let metrics = self.store.metrics();

        // Check cache first
        if let Some(bytes) = self.store.get(key).await {
            match self.codec.decode::<R::Entity>(&bytes) {
                Ok(entity) => {
                    metrics.record_hit();
                    tracing::trace!(key = %key, "Cache hit");
                    return Ok(Some(entity));
                }
                Err(err) => {
                    // Corrupt payload - count it and treat as a miss
                    metrics.record_error();
                    tracing::warn!(key = %key, error = %err, "Cached payload could not be decoded");
                }
            }
        }

        // Cache miss - fetch from repository
        metrics.record_miss();
        tracing::trace!(key = %key, "Cache miss");
        let entity = fetch().await?;

        if let Some(ref e) = entity {
            self.populate(key, e).await;
        }

        Ok(entity)
    }

    async fn populate(&self, key: &str, entity: &R::Entity) {
        if entity.is_deleted() {
            return;
        }
        match self.codec.encode(entity) {
            Ok(bytes) => self.store.set(key, &bytes, self.ttl).await,
            Err(err) => {
                self.store.metrics().record_error();
                tracing::warn!(key = %key, error = %err, "Failed to encode entity for cache");
            }
        }
    }

    async fn invalidate(&self, entity: &R::Entity) {
        let keys = self.keys.all_keys_for(entity);
        self.store.delete_many(&keys).await;
    }

    /// Invalidates the keys of `entity` if known, else just the id key.
    async fn invalidate_id(&self, id: Uuid, entity: Option<&R::Entity>) {
        match entity {
            Some(entity) => self.invalidate(entity).await,
            None => self.store.delete(&self.keys.key_by_id(id)).await,
        }
    }
}

#[async_trait]
impl<R, C, K> Repository for CachedRepository<R, C, K>
where
    R: Repository + 'static,
    C: Cache + ?Sized + 'static,
    K: CacheKeys<R::Entity> + 'static,
{
    type Entity = R::Entity;
    type Filter = R::Filter;

    async fn get_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<R::Entity>> {
        if include_deleted {
            return self.repository.get_by_id(id, true).await;
        }

        let key = self.keys.key_by_id(id);
        self.read_through(&key, || self.repository.get_by_id(id, false))
            .await
    }

    async fn get_all(&self, page: PageRequest, include_deleted: bool) -> Result<Vec<R::Entity>> {
        self.repository.get_all(page, include_deleted).await
    }

    async fn get_deleted(&self, page: PageRequest) -> Result<Vec<R::Entity>> {
        self.repository.get_deleted(page).await
    }

    async fn find(&self, filter: &R::Filter, page: PageRequest) -> Result<Vec<R::Entity>> {
        self.repository.find(filter, page).await
    }

    async fn count(&self, filter: &R::Filter) -> Result<u64> {
        self.repository.count(filter).await
    }

    async fn add(&self, entity: &R::Entity) -> Result<R::Entity> {
        // Not cached here; the first read populates
        let created = self.repository.add(entity).await?;
        tracing::debug!(
            id = %created.id(),
            entity_type = <R::Entity as Entity>::ENTITY_TYPE,
            "Entity created"
        );
        Ok(created)
    }

    async fn update(&self, entity: &R::Entity) -> Result<Option<R::Entity>> {
        // Natural keys may change, so the stale ones come from the stored version
        let previous = self.repository.get_by_id(entity.id(), true).await?;
        let Some(updated) = self.repository.update(entity).await? else {
            return Ok(None);
        };

        let mut keys = self.keys.all_keys_for(&updated);
        if let Some(ref previous) = previous {
            for key in self.keys.all_keys_for(previous) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        self.store.delete_many(&keys).await;

        tracing::debug!(
            id = %updated.id(),
            entity_type = <R::Entity as Entity>::ENTITY_TYPE,
            "Entity updated"
        );
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let existing = self.repository.get_by_id(id, true).await?;
        let deleted = self.repository.delete(id).await?;
        if deleted {
            self.invalidate_id(id, existing.as_ref()).await;
            tracing::debug!(
                %id,
                entity_type = <R::Entity as Entity>::ENTITY_TYPE,
                "Entity deleted"
            );
        }
        Ok(deleted)
    }

    async fn restore(&self, id: Uuid) -> Result<bool> {
        let existing = self.repository.get_by_id(id, true).await?;
        let restored = self.repository.restore(id).await?;
        if restored {
            self.invalidate_id(id, existing.as_ref()).await;
            tracing::debug!(
                %id,
                entity_type = <R::Entity as Entity>::ENTITY_TYPE,
                "Entity restored"
            );
        }
        Ok(restored)
    }

    async fn force_delete(&self, id: Uuid) -> Result<bool> {
        let existing = self.repository.get_by_id(id, true).await?;
        let removed = self.repository.force_delete(id).await?;
        if removed {
            self.invalidate_id(id, existing.as_ref()).await;
            tracing::debug!(
                %id,
                entity_type = <R::Entity as Entity>::ENTITY_TYPE,
                "Entity permanently deleted"
            );
        }
        Ok(removed)
    }
}
