//! Redis cache backend implementation.
//!
//! Provides a distributed cache shared by every process of a deployment,
//! with connection pooling, TTL, batch deletion and namespace flushes.

mod cache;
mod error;

pub use cache::RedisCache;
