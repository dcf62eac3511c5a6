//! Cache Module
//!
//! Request cache with TTL expiry, single-flight fetches, retry with
//! exponential backoff, rate-limit cooldown and session persistence.

mod api_cache;
pub mod config;
mod entry;
pub mod persistence;
mod rate_limit;
mod registry;
pub mod retry;
mod stats;
mod store;


// Re-export public types
pub use api_cache::{ApiCache, ApiCacheBuilder, FetchOptions};
pub use config::{CacheConfig, CacheProfile};
pub use entry::CacheEntry;
pub use persistence::{
    open_storage, FileStorage, MemoryStorage, NoopStorage, PersistenceAdapter, Storage,
};
pub use rate_limit::{RateLimitGuard, DEFAULT_COOLDOWN};
pub use registry::CacheRegistry;
pub use retry::{DefaultClassifier, ErrorClass, ErrorClassifier, RetryPolicy, StrictClassifier};
pub use stats::CacheStats;
pub use store::{CacheStore, Lookup};
