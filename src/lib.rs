//! API Cache - client-side request cache for a rate-limited REST backend
//!
//! Deduplicates concurrent fetches per key, serves fresh-enough data from
//! memory and session storage, retries transient failures with exponential
//! backoff and stops all fetching for a cooldown after a rate-limit signal.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{ApiCache, CacheConfig, CacheRegistry, FetchOptions};
pub use config::Config;
pub use error::{CacheError, FetchError, Result};
pub use tasks::spawn_cleanup_task;
