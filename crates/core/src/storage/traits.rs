use async_trait::async_trait;
use uuid::Uuid;

use crate::user::{User, UserFilter};

use super::{Entity, PageRequest, Result};

/// Soft-delete aware CRUD contract shared by the source of truth and by the
/// cached decorators, so callers can swap one for the other.
#[async_trait]
pub trait Repository: Send + Sync {
    /// The record type managed by this repository.
    type Entity: Entity;

    /// Filter criteria accepted by `find` and `count`.
    type Filter: Send + Sync;

    /// Gets a record by its ID, optionally including soft-deleted records.
    async fn get_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<Self::Entity>>;

    /// Lists records with offset pagination.
    async fn get_all(&self, page: PageRequest, include_deleted: bool)
        -> Result<Vec<Self::Entity>>;

    /// Lists only soft-deleted records.
    async fn get_deleted(&self, page: PageRequest) -> Result<Vec<Self::Entity>>;

    /// Lists records matching a filter.
    async fn find(&self, filter: &Self::Filter, page: PageRequest) -> Result<Vec<Self::Entity>>;

    /// Counts records matching a filter.
    async fn count(&self, filter: &Self::Filter) -> Result<u64>;

    /// Creates a new record and returns the stored version.
    async fn add(&self, entity: &Self::Entity) -> Result<Self::Entity>;

    /// Updates an existing record. Returns `None` if it does not exist.
    async fn update(&self, entity: &Self::Entity) -> Result<Option<Self::Entity>>;

    /// Soft-deletes a record. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Clears the soft-delete marker. Returns false if the record is not deleted.
    async fn restore(&self, id: Uuid) -> Result<bool>;

    /// Permanently removes a record, soft-deleted or not.
    async fn force_delete(&self, id: Uuid) -> Result<bool>;
}

/// Repository for user operations.
#[async_trait]
pub trait UserRepository: Repository<Entity = User, Filter = UserFilter> {
    /// Gets an active user by email address (case-insensitive).
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Gets an active user by username (case-insensitive).
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}
