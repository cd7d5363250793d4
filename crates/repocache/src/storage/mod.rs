//! Storage backend implementations.
//!
//! - [`inmemory`]: the source of truth, a `HashMap`-backed user repository
//! - [`cached`]: cache-aside decorators over any repository

pub mod cached;
pub mod inmemory;

pub use cached::{CachedRepository, CachedUserRepository};
pub use inmemory::InMemoryUserRepository;
