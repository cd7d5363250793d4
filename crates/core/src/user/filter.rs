//! Pure filter predicate for user search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::natural_key_eq;

use super::User;

/// Search criteria for users.
///
/// Substring filters are case-insensitive. Every unset criterion matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email_exact: Option<String>,
    pub username_exact: Option<String>,
    pub is_active: Option<bool>,
    pub tenant_id: Option<Uuid>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl UserFilter {
    /// Returns true if the user satisfies every set criterion.
    pub fn matches(&self, user: &User) -> bool {
        if !self.include_deleted && user.deleted_at.is_some() {
            return false;
        }
        if !contains_ci(Some(user.email.as_str()), self.email.as_deref())
            || !contains_ci(Some(user.username.as_str()), self.username.as_deref())
            || !contains_ci(user.full_name.as_deref(), self.full_name.as_deref())
        {
            return false;
        }
        if let Some(ref email) = self.email_exact {
            if !natural_key_eq(&user.email, email) {
                return false;
            }
        }
        if let Some(ref username) = self.username_exact {
            if !natural_key_eq(&user.username, username) {
                return false;
            }
        }
        if self.is_active.is_some_and(|active| user.is_active != active) {
            return false;
        }
        if self.tenant_id.is_some() && user.tenant_id != self.tenant_id {
            return false;
        }
        if self.created_after.is_some_and(|t| user.created_at <= t) {
            return false;
        }
        if self.created_before.is_some_and(|t| user.created_at >= t) {
            return false;
        }
        true
    }
}

fn contains_ci(value: Option<&str>, needle: Option<&str>) -> bool {
    match (value, needle) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(value), Some(needle)) => value.to_lowercase().contains(&needle.to_lowercase()),
    }
}
