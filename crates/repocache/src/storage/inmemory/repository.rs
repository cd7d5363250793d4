//! In-memory user repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use repocache_core::cache::natural_key_eq;
use repocache_core::storage::{
    Entity, PageRequest, Repository, RepositoryError, Result, UserRepository,
};
use repocache_core::user::{User, UserFilter};

/// In-memory user storage with soft delete.
///
/// Emails and usernames are unique among users that are not soft-deleted,
/// compared case-insensitively. Listings are ordered by creation time.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users, soft-deleted ones included.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_unique(users: &HashMap<Uuid, User>, candidate: &User) -> Result<()> {
        let live_others = || {
            users
                .values()
                .filter(|u| u.id != candidate.id && !u.is_deleted())
        };

        if live_others().any(|u| natural_key_eq(&u.email, &candidate.email)) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: User::ENTITY_TYPE,
                id: format!("email={}", candidate.email),
            });
        }
        if live_others().any(|u| natural_key_eq(&u.username, &candidate.username)) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: User::ENTITY_TYPE,
                id: format!("username={}", candidate.username),
            });
        }
        Ok(())
    }

    async fn list<F>(&self, page: PageRequest, predicate: F) -> Vec<User>
    where
        F: Fn(&User) -> bool,
    {
        let users = self.users.read().await;
        let mut matching: Vec<&User> = users
            .values()
            .filter(|u| page.tenant_id.is_none() || u.tenant_id == page.tenant_id)
            .filter(|u| predicate(u))
            .collect();
        matching.sort_by_key(|u| (u.created_at, u.id));
        page.apply(matching.into_iter().cloned())
    }
}

#[async_trait]
impl Repository for InMemoryUserRepository {
    type Entity = User;
    type Filter = UserFilter;

    async fn get_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .get(&id)
            .filter(|u| include_deleted || !u.is_deleted())
            .cloned())
    }

    async fn get_all(&self, page: PageRequest, include_deleted: bool) -> Result<Vec<User>> {
        Ok(self
            .list(page, |u| include_deleted || !u.is_deleted())
            .await)
    }

    async fn get_deleted(&self, page: PageRequest) -> Result<Vec<User>> {
        Ok(self.list(page, |u| u.is_deleted()).await)
    }

    async fn find(&self, filter: &UserFilter, page: PageRequest) -> Result<Vec<User>> {
        Ok(self.list(page, |u| filter.matches(u)).await)
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| filter.matches(u)).count() as u64)
    }

    async fn add(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: User::ENTITY_TYPE,
                id: user.id.to_string(),
            });
        }
        Self::check_unique(&users, user)?;

        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Ok(None);
        }
        Self::check_unique(&users, user)?;

        let mut stored = user.clone();
        stored.updated_at = Utc::now();
        users.insert(stored.id, stored.clone());
        Ok(Some(stored))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) if !user.is_deleted() => {
                user.soft_delete();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restore(&self, id: Uuid) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(candidate) = users.get(&id).filter(|u| u.is_deleted()).cloned() else {
            return Ok(false);
        };
        // A live user may have claimed the email or username in the meantime
        Self::check_unique(&users, &candidate)?;

        if let Some(user) = users.get_mut(&id) {
            user.restore();
        }
        Ok(true)
    }

    async fn force_delete(&self, id: Uuid) -> Result<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        let email = email.trim();
        Ok(users
            .values()
            .find(|u| !u.is_deleted() && natural_key_eq(&u.email, email))
            .cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| !u.is_deleted() && natural_key_eq(&u.username, username))
            .cloned())
    }
}
