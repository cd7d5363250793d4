//! Pure functions for turning entities into cache payloads and back.
//!
//! A payload is one tag byte followed by the body. The body is the JSON
//! form of the entity, zstd-compressed when it reaches the configured size
//! threshold. Payloads carry no schema version: changing an entity's shape
//! requires flushing its cache namespace.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::CacheError;

/// Tag for an uncompressed JSON body.
pub const TAG_RAW: u8 = 0x00;

/// Tag for a zstd-compressed JSON body.
pub const TAG_ZSTD: u8 = 0x01;

/// Errors that can occur while encoding or decoding a cache payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
    #[error("Compression failed: {0}")]
    CompressionFailed(String),
    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),
    #[error("Unknown payload tag: {0:#04x}")]
    UnknownTag(u8),
    #[error("Empty payload")]
    Empty,
}

impl From<CodecError> for CacheError {
    fn from(err: CodecError) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// When and how hard to compress payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionConfig {
    pub enabled: bool,
    /// Minimum JSON size in bytes before compression applies.
    pub threshold: usize,
    /// zstd level (1-22).
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 1024,
            level: 3,
        }
    }
}

/// Serializes entities to tagged cache payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheCodec {
    compression: CompressionConfig,
}

impl CacheCodec {
    pub fn new(compression: CompressionConfig) -> Self {
        Self { compression }
    }

    /// A codec that never compresses.
    pub fn uncompressed() -> Self {
        Self::new(CompressionConfig {
            enabled: false,
            ..CompressionConfig::default()
        })
    }

    pub fn compression(&self) -> CompressionConfig {
        self.compression
    }

    /// Encodes a value into a tagged payload.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let json =
            serde_json::to_vec(value).map_err(|e| CodecError::SerializeFailed(e.to_string()))?;

        if self.compression.enabled && json.len() >= self.compression.threshold {
            let compressed = zstd::encode_all(json.as_slice(), self.compression.level)
                .map_err(|e| CodecError::CompressionFailed(e.to_string()))?;
            let mut payload = Vec::with_capacity(compressed.len() + 1);
            payload.push(TAG_ZSTD);
            payload.extend_from_slice(&compressed);
            return Ok(payload);
        }

        let mut payload = Vec::with_capacity(json.len() + 1);
        payload.push(TAG_RAW);
        payload.extend_from_slice(&json);
        Ok(payload)
    }

    /// Decodes a tagged payload, decompressing when the tag says so.
    ///
    /// Decoding does not depend on this codec's compression settings, so
    /// payloads written before a configuration change stay readable.
    pub fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T> {
        let (&tag, body) = payload.split_first().ok_or(CodecError::Empty)?;

        match tag {
            TAG_RAW => from_json(body),
            TAG_ZSTD => {
                let json = zstd::decode_all(body)
                    .map_err(|e| CodecError::DecompressionFailed(e.to_string()))?;
                from_json(&json)
            }
            other => Err(CodecError::UnknownTag(other)),
        }
    }

    /// Returns true if the payload carries a compressed body.
    pub fn is_compressed(payload: &[u8]) -> bool {
        payload.first() == Some(&TAG_ZSTD)
    }
}

fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::DeserializeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::User;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn fixed_user() -> User {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        User::new("alice@example.com", "alice")
            .with_id(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap())
            .with_full_name("Alice Liddell")
            .with_tenant(Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap())
            .with_created_at(ts)
            .with_updated_at(ts)
    }

    fn large_user() -> User {
        fixed_user().with_full_name("Alice ".repeat(400))
    }

    #[test]
    fn test_roundtrip_small_payload_is_raw() {
        let codec = CacheCodec::default();
        let user = fixed_user();

        let bytes = codec.encode(&user).expect("encode should succeed");
        assert_eq!(bytes[0], TAG_RAW);
        assert!(!CacheCodec::is_compressed(&bytes));

        let decoded: User = codec.decode(&bytes).expect("decode should succeed");
        assert_eq!(decoded, user);
    }

    #[test]
    fn test_roundtrip_large_payload_is_compressed() {
        let codec = CacheCodec::default();
        let user = large_user();
        let json_len = serde_json::to_vec(&user).unwrap().len();

        let bytes = codec.encode(&user).expect("encode should succeed");
        assert!(CacheCodec::is_compressed(&bytes));
        assert!(bytes.len() < json_len);

        let decoded: User = codec.decode(&bytes).expect("decode should succeed");
        assert_eq!(decoded, user);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let user = fixed_user();
        let json_len = serde_json::to_vec(&user).unwrap().len();

        let at = CacheCodec::new(CompressionConfig {
            threshold: json_len,
            ..CompressionConfig::default()
        });
        assert!(CacheCodec::is_compressed(&at.encode(&user).unwrap()));

        let above = CacheCodec::new(CompressionConfig {
            threshold: json_len + 1,
            ..CompressionConfig::default()
        });
        assert!(!CacheCodec::is_compressed(&above.encode(&user).unwrap()));
    }

    #[test]
    fn test_disabled_compression_never_compresses() {
        let codec = CacheCodec::uncompressed();
        let bytes = codec.encode(&large_user()).unwrap();
        assert_eq!(bytes[0], TAG_RAW);
    }

    #[test]
    fn test_uncompressed_codec_reads_compressed_payload() {
        let bytes = CacheCodec::default().encode(&large_user()).unwrap();
        let decoded: User = CacheCodec::uncompressed().decode(&bytes).unwrap();
        assert_eq!(decoded, large_user());
    }

    #[test]
    fn test_decode_empty_payload() {
        let result: Result<User> = CacheCodec::default().decode(&[]);
        assert_eq!(result.unwrap_err(), CodecError::Empty);
    }

    #[test]
    fn test_decode_unknown_tag() {
        let result: Result<User> = CacheCodec::default().decode(&[0x07, b'{', b'}']);
        assert_eq!(result.unwrap_err(), CodecError::UnknownTag(0x07));
    }

    #[test]
    fn test_decode_malformed_json() {
        let mut payload = vec![TAG_RAW];
        payload.extend_from_slice(b"not valid json");
        let result: Result<User> = CacheCodec::default().decode(&payload);
        assert!(matches!(result, Err(CodecError::DeserializeFailed(_))));
    }

    #[test]
    fn test_decode_corrupt_zstd_frame() {
        let payload = [TAG_ZSTD, 0xde, 0xad, 0xbe, 0xef];
        let result: Result<User> = CacheCodec::default().decode(&payload);
        assert!(matches!(result, Err(CodecError::DecompressionFailed(_))));
    }

    #[test]
    fn test_codec_error_converts_to_cache_error() {
        let err: CacheError = CodecError::UnknownTag(0x07).into();
        assert_eq!(
            err,
            CacheError::Serialization("Unknown payload tag: 0x07".to_string())
        );
    }

    #[test]
    fn test_soft_deleted_user_roundtrip() {
        let codec = CacheCodec::default();
        let mut user = fixed_user();
        user.soft_delete();

        let decoded: User = codec.decode(&codec.encode(&user).unwrap()).unwrap();
        assert_eq!(decoded.deleted_at, user.deleted_at);
    }
}
