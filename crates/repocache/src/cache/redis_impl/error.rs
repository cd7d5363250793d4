//! Redis error mapping to CacheError.

use redis::ErrorKind;
use repocache_core::cache::CacheError;

/// Maps Redis errors to CacheError.
///
/// Transport failures become `ConnectionFailed`, reply conversion failures
/// become `Serialization`, everything else is an `OperationFailed`.
pub fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
        CacheError::ConnectionFailed(err.to_string())
    } else if err.kind() == ErrorKind::TypeError {
        CacheError::Serialization(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}
