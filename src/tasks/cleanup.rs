//! Expired Entry Cleanup Task
//!
//! Background task that periodically sweeps expired entries out of every
//! cache instance and its persisted namespace.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheRegistry;

/// Spawns a background task that periodically purges expired cache entries.
///
/// Reads already evict lazily; the sweep keeps entries nobody reads again
/// from lingering in memory and storage.
///
/// # Arguments
/// * `caches` - Registry whose instances are swept
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(caches: CacheRegistry, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            for (name, cache) in caches.iter() {
                let removed = cache.purge_expired();
                if removed > 0 {
                    info!(cache = name, "Cleanup: removed {} expired entries", removed);
                } else {
                    debug!(cache = name, "Cleanup: no expired entries found");
                }
            }
        }
    })
}
