//! In-memory storage backend.
//!
//! Stores users in a `HashMap` wrapped in `Arc<RwLock<_>>`. It is the source
//! of truth for the operator binary and for tests; nothing is persisted.
//!
//! # Example
//!
//! ```rust,ignore
//! use repocache::storage::inmemory::InMemoryUserRepository;
//!
//! let repo = InMemoryUserRepository::new();
//! let user = repo.add(&User::new("a@x.com", "alice")).await?;
//! ```

mod repository;

pub use repository::InMemoryUserRepository;
