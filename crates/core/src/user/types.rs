use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Entity;

/// A system user with optional tenant membership.
///
/// The email address is always stored lowercase so lookups and cache keys
/// are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    /// Tenant identifier for multi-tenancy isolation.
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None while the user is active).
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new active user with a time-ordered ID.
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: normalize_email(email.into()),
            username: username.into(),
            full_name: None,
            is_active: true,
            tenant_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Sets a specific ID for this user (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Replaces the email address, normalizing it to lowercase.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = normalize_email(email.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Sets the creation timestamp (useful for testing).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Sets the modification timestamp (useful for testing).
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// Marks the user as deleted without removing it.
    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Clears the soft delete marker.
    pub fn restore(&mut self) {
        self.deleted_at = None;
        self.updated_at = Utc::now();
    }
}

impl Entity for User {
    const CACHE_PREFIX: &'static str = "user";
    const ENTITY_TYPE: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn natural_keys(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("email", Some(self.email.as_str())),
            ("username", Some(self.username.as_str())),
        ]
    }
}

fn normalize_email(email: String) -> String {
    email.trim().to_lowercase()
}
