//! In-memory cache backend implementation.
//!
//! Provides a single-process cache for development and tests. Mirrors the
//! Redis backend: TTL, batch deletion and glob pattern deletion.

mod cache;

pub use cache::MemoryCache;
