use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of records returned by list operations.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// A domain record owned by a repository and mirrored by the cache.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Namespace used for every cache key of this entity (e.g. `"user"`).
    const CACHE_PREFIX: &'static str;

    /// Human readable type name used in repository errors (e.g. `"User"`).
    const ENTITY_TYPE: &'static str;

    /// Returns the unique identifier.
    fn id(&self) -> Uuid;

    /// Returns true if the record has been soft-deleted.
    fn is_deleted(&self) -> bool;

    /// Returns every natural-key field with its current value.
    ///
    /// Fields whose value is null are reported as `None` so that key schemes
    /// can skip them.
    fn natural_keys(&self) -> Vec<(&'static str, Option<&str>)> {
        Vec::new()
    }
}

/// Offset pagination with optional tenant scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub skip: usize,
    pub limit: usize,
    pub tenant_id: Option<Uuid>,
}

impl PageRequest {
    /// Creates a page request without tenant scoping.
    pub fn new(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit,
            tenant_id: None,
        }
    }

    /// Restricts the page to a single tenant.
    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Applies the offset and limit to an already filtered iterator.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.limit).collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page() {
        let page = PageRequest::default();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, DEFAULT_PAGE_LIMIT);
        assert!(page.tenant_id.is_none());
    }

    #[test]
    fn test_apply_skips_and_limits() {
        let page = PageRequest::new(2, 3);
        assert_eq!(page.apply(0..10), vec![2, 3, 4]);
    }

    #[test]
    fn test_apply_past_end_is_empty() {
        let page = PageRequest::new(20, 5);
        assert!(page.apply(0..10).is_empty());
    }

    #[test]
    fn test_with_tenant() {
        let tenant = Uuid::nil();
        let page = PageRequest::default().with_tenant(tenant);
        assert_eq!(page.tenant_id, Some(tenant));
    }
}
