//! Wiring of repositories, cache backend and metrics.
//!
//! The cache backend is chosen at compile time via feature flags; whether
//! the repository is wrapped with the cache at all is a runtime decision
//! (`CACHE_ENABLED`).

use std::sync::Arc;

use repocache_core::cache::{Cache, CacheCodec, CacheMetrics, CacheMetricsSnapshot};
use repocache_core::storage::UserRepository;

use crate::cache::KeyValueStore;
use crate::config::Config;
use crate::storage::cached::CachedUserRepository;
use crate::storage::inmemory::InMemoryUserRepository;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// User repository (cached when the cache is enabled).
    pub users: Arc<dyn UserRepository>,
    /// Fail-soft store shared by every cached repository. `None` when the
    /// cache is disabled.
    pub store: Option<KeyValueStore<dyn Cache>>,
}

impl AppState {
    fn build(
        source: Arc<InMemoryUserRepository>,
        cache: Option<Arc<dyn Cache>>,
        config: &Config,
    ) -> Self {
        let Some(cache) = cache else {
            tracing::info!("Cache disabled, using repository directly");
            return Self {
                users: source,
                store: None,
            };
        };

        let store = KeyValueStore::new(cache, Arc::new(CacheMetrics::new()))
            .with_timeout(config.cache_timeout());
        let users = CachedUserRepository::for_users(source, store.clone(), config.cache_ttl())
            .with_codec(CacheCodec::new(config.compression()));

        Self {
            users: Arc::new(users),
            store: Some(store),
        }
    }

    /// Point-in-time cache counters, if the cache is enabled.
    pub fn metrics(&self) -> Option<CacheMetricsSnapshot> {
        self.store.as_ref().map(|store| store.metrics().snapshot())
    }
}

/// Connects the configured cache backend and wraps it in a fail-soft store.
pub async fn connect_store(config: &Config) -> Result<KeyValueStore<dyn Cache>, anyhow::Error> {
    let cache = connect_cache(config).await?;
    Ok(KeyValueStore::new(cache, Arc::new(CacheMetrics::new()))
        .with_timeout(config.cache_timeout()))
}

// ============================================================================
// Factory functions for each cache backend
// ============================================================================

#[cfg(feature = "memory")]
mod memory_backend {
    use super::*;
    use crate::cache::MemoryCache;

    pub(super) async fn connect_cache(config: &Config) -> Result<Arc<dyn Cache>, anyhow::Error> {
        Ok(Arc::new(MemoryCache::new(config.cache_max_entries)))
    }

    impl AppState {
        /// Creates AppState with in-memory storage and in-memory cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let source = Arc::new(InMemoryUserRepository::new());
            let cache = if config.cache_enabled {
                Some(connect_cache(config).await?)
            } else {
                None
            };
            Ok(Self::build(source, cache, config))
        }
    }
}

#[cfg(feature = "memory")]
use memory_backend::connect_cache;

#[cfg(feature = "redis")]
mod redis_backend {
    use super::*;
    use crate::cache::RedisCache;

    pub(super) async fn connect_cache(config: &Config) -> Result<Arc<dyn Cache>, anyhow::Error> {
        Ok(Arc::new(RedisCache::new(&config.redis_url).await?))
    }

    impl AppState {
        /// Creates AppState with in-memory storage and Redis cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let source = Arc::new(InMemoryUserRepository::new());
            let cache = if config.cache_enabled {
                Some(connect_cache(config).await?)
            } else {
                None
            };
            Ok(Self::build(source, cache, config))
        }
    }
}

#[cfg(feature = "redis")]
use redis_backend::connect_cache;
