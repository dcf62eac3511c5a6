//! Cache Store Module
//!
//! In-memory entry map with lazy TTL eviction and per-key retry counters.
//! Persistence is layered on top by the owning `ApiCache`.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::cache::CacheEntry;

// == Lookup ==
/// Outcome of a store read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Live entry found
    Hit(Value),
    /// Entry existed but had expired; it has been removed
    Expired,
    /// Nothing stored under the key
    Miss,
}

// == Cache Store ==
/// Key to entry map owned by exactly one cache instance.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Consecutive failed attempts for the current resolution cycle
    retry_attempts: HashMap<String, u32>,
    hits: u64,
    misses: u64,
}

impl CacheStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns the live value for `key`, evicting it if it has expired.
    pub fn get(&mut self, key: &str, now_ms: u64) -> Lookup {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired(now_ms) => {
                self.entries.remove(key);
                self.misses += 1;
                Lookup::Expired
            }
            Some(entry) => {
                self.hits += 1;
                Lookup::Hit(entry.data.clone())
            }
            None => {
                self.misses += 1;
                Lookup::Miss
            }
        }
    }

    // == Insert ==
    /// Stores an entry, replacing any previous one, and resets the retry counter.
    pub fn insert(&mut self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_string(), entry);
        self.retry_attempts.remove(key);
    }

    /// Loads an entry restored from persistence without touching counters.
    pub fn restore(&mut self, key: String, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    // == Remove ==
    /// Removes the entry and retry counter. Returns whether an entry existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.retry_attempts.remove(key);
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Drops every entry and retry counter.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.retry_attempts.clear();
    }

    // == Retry Counters ==
    /// Records the attempt number reached for `key`.
    pub fn record_retry(&mut self, key: &str, attempt: u32) {
        self.retry_attempts.insert(key.to_string(), attempt);
    }

    pub fn retry_attempts(&self) -> BTreeMap<String, u32> {
        self.retry_attempts
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns their keys.
    pub fn purge_expired(&mut self, now_ms: u64) -> Vec<String> {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
        }

        expired
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
