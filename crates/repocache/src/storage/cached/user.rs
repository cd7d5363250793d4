//! Cached user repository.
//!
//! Binds the generic decorator to [`User`], whose natural keys are `email`
//! and `username`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use repocache_core::cache::{Cache, CacheKeys, EntityCacheKeys};
use repocache_core::storage::{Result, UserRepository};
use repocache_core::user::User;

use crate::cache::KeyValueStore;

use super::CachedRepository;

/// Cached user repository decorator.
///
/// Keys: `user:<id>`, `user:email:<email>` and `user:username:<username>`,
/// natural-key values lowercased.
pub type CachedUserRepository<R, C> = CachedRepository<R, C, EntityCacheKeys<User>>;

impl<R, C> CachedRepository<R, C, EntityCacheKeys<User>>
where
    R: UserRepository,
    C: Cache + ?Sized,
{
    /// Creates a cached user repository with the standard user key scheme.
    pub fn for_users(repository: Arc<R>, store: KeyValueStore<C>, ttl: Duration) -> Self {
        Self::new(repository, store, EntityCacheKeys::new(), ttl)
    }
}

#[async_trait]
impl<R, C, K> UserRepository for CachedRepository<R, C, K>
where
    R: UserRepository + 'static,
    C: Cache + ?Sized + 'static,
    K: CacheKeys<User> + 'static,
{
    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_by_natural_key("email", email.trim(), || self.inner().get_by_email(email))
            .await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_by_natural_key("username", username, || {
            self.inner().get_by_username(username)
        })
        .await
    }
}
