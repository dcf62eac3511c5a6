//! Cache Entry Module
//!
//! Defines one cached fetch result with its TTL metadata. The same shape is
//! written to the persistence medium as JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single cached value. Replaced wholesale on every set, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached payload
    pub data: Value,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expiry: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped at `now_ms` that lives for `ttl`.
    pub fn new(data: Value, now_ms: u64, ttl: Duration) -> Self {
        Self {
            data,
            timestamp: now_ms,
            expiry: now_ms.saturating_add(ttl.as_millis() as u64),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now >= expiry`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expiry <= now_ms
    }

    // == Time To Live ==
    /// Remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.expiry.saturating_sub(now_ms))
    }
}
