//! Cached repository decorators.
//!
//! This module provides a decorator that wraps a repository with caching
//! behavior. The decorator implements the cache-aside pattern:
//!
//! - **Reads**: Check cache first, on miss fetch from repository and populate cache
//! - **Writes**: Persist to repository, then invalidate every cache key of the entity
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let repo = Arc::new(InMemoryUserRepository::new());
//! let store = KeyValueStore::new(Arc::new(MemoryCache::new(10_000)), Arc::new(CacheMetrics::new()));
//!
//! let cached_repo = CachedUserRepository::for_users(repo, store, Duration::from_secs(300));
//! ```

mod repository;
mod user;

pub use repository::CachedRepository;
pub use user::CachedUserRepository;
