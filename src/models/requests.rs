//! Request DTOs for the diagnostics API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

/// Request body for priming an entry (PUT /caches/:name/entries/:key)
///
/// # Fields
/// - `value`: Any JSON value to cache
/// - `ttl_ms`: Optional TTL in milliseconds (instance default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetEntryRequest {
    /// The value to store
    pub value: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetEntryRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.ttl_ms == Some(0) {
            return Some("ttl_ms must be greater than zero".to_string());
        }
        None
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}
