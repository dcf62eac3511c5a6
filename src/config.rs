//! Configuration Module
//!
//! Handles loading process configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheConfig;

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Cache overrides apply on top of every instance profile when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP diagnostics server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Session file for persisted entries; in-memory medium when `None`
    pub storage_path: Option<PathBuf>,
    /// Overrides every profile's retry budget
    pub max_retries: Option<u32>,
    /// Overrides every profile's base retry delay (ms)
    pub base_retry_delay_ms: Option<u64>,
    /// Overrides every profile's rate-limit cooldown (ms)
    pub rate_limit_cooldown_ms: Option<u64>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expired-entry sweep frequency in seconds (default: 30)
    /// - `CACHE_STORAGE_PATH` - Session file path (default: unset, in-memory)
    /// - `CACHE_MAX_RETRIES` - Retry budget override
    /// - `CACHE_BASE_RETRY_DELAY_MS` - Base backoff override
    /// - `CACHE_RATE_LIMIT_COOLDOWN_MS` - Cooldown override
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            storage_path: env::var("CACHE_STORAGE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            max_retries: parse_var("CACHE_MAX_RETRIES"),
            base_retry_delay_ms: parse_var("CACHE_BASE_RETRY_DELAY_MS"),
            rate_limit_cooldown_ms: parse_var("CACHE_RATE_LIMIT_COOLDOWN_MS"),
        }
    }

    /// Applies the overrides to one instance config.
    pub fn tune(&self, mut config: CacheConfig) -> CacheConfig {
        if let Some(max_retries) = self.max_retries {
            config = config.with_max_retries(max_retries);
        }
        if let Some(ms) = self.base_retry_delay_ms {
            config = config.with_base_retry_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = self.rate_limit_cooldown_ms {
            config = config.with_rate_limit_cooldown(Duration::from_millis(ms));
        }
        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 30,
            storage_path: None,
            max_retries: None,
            base_retry_delay_ms: None,
            rate_limit_cooldown_ms: None,
        }
    }
}
