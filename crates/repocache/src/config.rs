use std::{env, time::Duration};

use repocache_core::cache::CompressionConfig;

/// Cache configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether repositories are wrapped with the cache at all (default: true)
    pub cache_enabled: bool,
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Per-call timeout for cache backend operations in milliseconds (default: 200)
    pub cache_timeout_ms: u64,
    /// Maximum number of cache entries for the memory backend (default: 10,000)
    pub cache_max_entries: usize,
    /// Whether large payloads are compressed (default: true)
    pub compression_enabled: bool,
    /// Payload size in bytes at which compression kicks in (default: 1024)
    pub compression_threshold: usize,
    /// zstd compression level (default: 3)
    pub compression_level: i32,
    /// Redis connection URL (default: "redis://localhost:6379/0")
    /// Note: Only used when the `redis` feature is enabled.
    pub redis_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_ENABLED` - Enable the cache layer (default: true)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 300)
    /// - `CACHE_TIMEOUT_MS` - Backend call timeout in milliseconds (default: 200)
    /// - `CACHE_MAX_ENTRIES` - Maximum memory cache entries (default: 10,000)
    /// - `CACHE_COMPRESSION_ENABLED` - Compress large payloads (default: true)
    /// - `CACHE_COMPRESSION_THRESHOLD` - Compression threshold in bytes (default: 1024)
    /// - `CACHE_COMPRESSION_LEVEL` - zstd level (default: 3)
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379/0")
    pub fn from_env() -> Self {
        Self {
            cache_enabled: parse_var("CACHE_ENABLED").unwrap_or(true),
            cache_ttl_seconds: parse_var("CACHE_TTL").unwrap_or(300),
            cache_timeout_ms: parse_var("CACHE_TIMEOUT_MS").unwrap_or(200),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES").unwrap_or(10_000),
            compression_enabled: parse_var("CACHE_COMPRESSION_ENABLED").unwrap_or(true),
            compression_threshold: parse_var("CACHE_COMPRESSION_THRESHOLD").unwrap_or(1024),
            compression_level: parse_var("CACHE_COMPRESSION_LEVEL").unwrap_or(3),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379/0".to_string()),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Get the backend call timeout as a Duration.
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    /// Compression settings for the payload codec.
    pub fn compression(&self) -> CompressionConfig {
        CompressionConfig {
            enabled: self.compression_enabled,
            threshold: self.compression_threshold,
            level: self.compression_level,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            cache_enabled: true,
            cache_ttl_seconds: 600,
            cache_timeout_ms: 150,
            cache_max_entries: 10_000,
            compression_enabled: false,
            compression_threshold: 2048,
            compression_level: 5,
            redis_url: "redis://localhost:6379/0".to_string(),
        }
    }

    #[test]
    fn test_duration_conversions() {
        let config = sample();

        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.cache_timeout(), Duration::from_millis(150));
    }

    #[test]
    fn test_compression_settings() {
        let compression = sample().compression();

        assert!(!compression.enabled);
        assert_eq!(compression.threshold, 2048);
        assert_eq!(compression.level, 5);
    }

    #[test]
    fn test_default_values() {
        // Clear environment variables to test defaults
        for name in [
            "CACHE_ENABLED",
            "CACHE_TTL",
            "CACHE_TIMEOUT_MS",
            "CACHE_MAX_ENTRIES",
            "CACHE_COMPRESSION_ENABLED",
            "CACHE_COMPRESSION_THRESHOLD",
            "CACHE_COMPRESSION_LEVEL",
            "REDIS_URL",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();

        assert!(config.cache_enabled);
        assert_eq!(config.cache_ttl_seconds, 300);
        assert_eq!(config.cache_timeout_ms, 200);
        assert_eq!(config.cache_max_entries, 10_000);
        assert!(config.compression_enabled);
        assert_eq!(config.compression_threshold, 1024);
        assert_eq!(config.compression_level, 3);
        assert_eq!(config.redis_url, "redis://localhost:6379/0");
    }
}
