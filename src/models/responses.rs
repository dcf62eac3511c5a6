//! Response DTOs for the diagnostics API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for reading an entry (GET /caches/:name/entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    /// Instance name
    pub cache: String,
    /// The requested key
    pub key: String,
    /// The cached value
    pub value: Value,
}

impl EntryResponse {
    pub fn new(cache: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            cache: cache.into(),
            key: key.into(),
            value,
        }
    }
}

/// Response body for priming an entry (PUT /caches/:name/entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct SetEntryResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetEntryResponse {
    pub fn new(cache: &str, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' cached in '{}'", key, cache),
            key,
        }
    }
}

/// Response body for invalidation (DELETE /caches/:name/entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// The key that was invalidated
    pub key: String,
}

impl InvalidateResponse {
    pub fn new(cache: &str, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' invalidated in '{}'", key, cache),
            key,
        }
    }
}

/// Response body for clearing an instance (DELETE /caches/:name)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Entries held before the clear
    pub removed: usize,
}

impl ClearResponse {
    pub fn new(cache: &str, removed: usize) -> Self {
        Self {
            message: format!("Cache '{}' cleared", cache),
            removed,
        }
    }
}

/// Response body for the stats endpoints (GET /stats, GET /caches/:name/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }

    /// Stats of every instance keyed by short name.
    pub fn all(stats: BTreeMap<String, CacheStats>) -> BTreeMap<String, Self> {
        stats
            .into_iter()
            .map(|(name, stats)| (name, Self::new(stats)))
            .collect()
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
