mod codec;
mod error;
mod keys;
mod metrics;
mod patterns;
mod traits;

pub use codec::{CacheCodec, CodecError, CompressionConfig, TAG_RAW, TAG_ZSTD};
pub use error::{CacheError, Result};
pub use keys::{
    entity_key, fold_natural_key, namespace_pattern, natural_key, natural_key_eq, user_email_key, user_key, user_username_key,
    EntityCacheKeys,
};
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use patterns::pattern_matches;
pub use traits::{Cache, CacheKeys};
