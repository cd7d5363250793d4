//! Core types and contracts for `repocache`.
//!
//! This crate holds everything that does not perform I/O: the entity and
//! repository contracts, the cache backend contract, cache-key derivation,
//! the payload codec and the cache metrics counters.

pub mod cache;
pub mod storage;
pub mod user;
