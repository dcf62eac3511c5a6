//! Cache Statistics Module
//!
//! Diagnostic snapshot of one cache instance.

use std::collections::BTreeMap;

use serde::Serialize;

// == Cache Stats ==
/// Read-only view of an instance's maps and lookup counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Instance namespace
    pub name: String,
    /// Entries currently held in memory (expired ones included until touched)
    pub cache_size: usize,
    /// Fetches currently in flight
    pub pending_requests: usize,
    /// Failed attempts per key in the current resolution cycle
    pub retry_attempts: BTreeMap<String, u32>,
    /// Whether the rate-limit cooldown is active
    pub rate_limited: bool,
    /// Lookups answered from memory
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
