//! Cache-aside decorators for CRUD repositories.
//!
//! A [`storage::CachedRepository`] wraps any
//! [`Repository`](repocache_core::storage::Repository) and serves
//! single-entity lookups from a key-value cache. Cache failures are absorbed
//! by [`cache::KeyValueStore`] and never reach the caller.

pub mod cache;
pub mod config;
pub mod state;
pub mod storage;
