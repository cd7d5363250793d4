use std::marker::PhantomData;

use uuid::Uuid;

use crate::storage::Entity;
use crate::user::User;

use super::CacheKeys;

/// Returns the primary cache key of an entity: `"<prefix>:<id>"`.
pub fn entity_key(prefix: &str, id: Uuid) -> String {
    format!("{}:{}", prefix, id)
}

/// Case folding applied to natural-key values (Unicode lowercase).
///
/// Repositories that match natural keys case-insensitively must compare with
/// [`natural_key_eq`], otherwise two distinct rows could share one cache key.
pub fn fold_natural_key(value: &str) -> String {
    value.to_lowercase()
}

/// Whether two natural-key values resolve to the same cache key.
pub fn natural_key_eq(a: &str, b: &str) -> bool {
    a == b || fold_natural_key(a) == fold_natural_key(b)
}

/// Returns the natural-key cache key: `"<prefix>:<field>:<folded value>"`.
pub fn natural_key(prefix: &str, field: &str, value: &str) -> String {
    format!("{}:{}:{}", prefix, field, fold_natural_key(value))
}

/// Returns the glob pattern covering every key of an entity namespace.
pub fn namespace_pattern(prefix: &str) -> String {
    format!("{}:*", prefix)
}

/// Returns the cache key for a user.
pub fn user_key(user_id: Uuid) -> String {
    entity_key(User::CACHE_PREFIX, user_id)
}

/// Returns the cache key for a user looked up by email.
pub fn user_email_key(email: &str) -> String {
    natural_key(User::CACHE_PREFIX, "email", email)
}

/// Returns the cache key for a user looked up by username.
pub fn user_username_key(username: &str) -> String {
    natural_key(User::CACHE_PREFIX, "username", username)
}

/// Key scheme derived from the [`Entity`] description itself.
///
/// The id key is `"<prefix>:<id>"` and each non-null natural key `f` with
/// value `v` maps to `"<prefix>:<f>:<lowercase(v)>"`.
pub struct EntityCacheKeys<T> {
    _entity: PhantomData<fn() -> T>,
}

impl<T> EntityCacheKeys<T> {
    pub fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<T> Default for EntityCacheKeys<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> CacheKeys<T> for EntityCacheKeys<T> {
    fn key_by_id(&self, id: Uuid) -> String {
        entity_key(T::CACHE_PREFIX, id)
    }

    fn key_by_natural(&self, field: &str, value: &str) -> String {
        natural_key(T::CACHE_PREFIX, field, value)
    }

    fn all_keys_for(&self, entity: &T) -> Vec<String> {
        let mut keys = vec![self.key_by_id(entity.id())];
        keys.extend(
            entity
                .natural_keys()
                .into_iter()
                .filter_map(|(field, value)| value.map(|v| self.key_by_natural(field, v))),
        );
        keys
    }
}
