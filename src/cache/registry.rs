//! Cache Registry Module
//!
//! Builds the application's cache instances once at startup and hands out
//! handles to them. Each instance is fully isolated; they only share the
//! persistence medium, where namespaces keep them apart.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::cache::config::{CacheConfig, CacheProfile};
use crate::cache::persistence::Storage;
use crate::cache::retry::{DefaultClassifier, ErrorClassifier};
use crate::cache::{ApiCache, CacheStats};
use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, Result};

// == Cache Registry ==
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    instances: BTreeMap<&'static str, ApiCache>,
}

impl CacheRegistry {
    /// Builds every profile over `storage` with the system clock.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_overrides(storage, Arc::new(SystemClock), Arc::new(DefaultClassifier), |c| c)
    }

    /// Builds every profile, letting `tune` adjust each instance's config.
    pub fn with_overrides(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        classifier: Arc<dyn ErrorClassifier>,
        tune: impl Fn(CacheConfig) -> CacheConfig,
    ) -> Self {
        let instances = CacheProfile::ALL
            .into_iter()
            .map(|profile| {
                let cache = ApiCache::builder(tune(profile.config()))
                    .storage(Arc::clone(&storage))
                    .clock(Arc::clone(&clock))
                    .classifier(Arc::clone(&classifier))
                    .build();
                info!(
                    instance = profile.name(),
                    namespace = %cache.name(),
                    ttl = ?cache.config().default_ttl,
                    "Cache instance ready"
                );
                (profile.name(), cache)
            })
            .collect();

        Self { instances }
    }

    pub fn profile(&self, profile: CacheProfile) -> &ApiCache {
        // Every profile is inserted in the constructors.
        &self.instances[profile.name()]
    }

    pub fn general(&self) -> &ApiCache {
        self.profile(CacheProfile::General)
    }

    pub fn dashboard(&self) -> &ApiCache {
        self.profile(CacheProfile::Dashboard)
    }

    pub fn wallet(&self) -> &ApiCache {
        self.profile(CacheProfile::Wallet)
    }

    pub fn transactions(&self) -> &ApiCache {
        self.profile(CacheProfile::Transactions)
    }

    /// Looks an instance up by its short name.
    pub fn get(&self, name: &str) -> Result<&ApiCache> {
        self.instances
            .get(name)
            .ok_or_else(|| CacheError::UnknownInstance(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ApiCache)> {
        self.instances.iter().map(|(name, cache)| (*name, cache))
    }

    pub fn stats(&self) -> BTreeMap<String, CacheStats> {
        self.iter()
            .map(|(name, cache)| (name.to_string(), cache.get_stats()))
            .collect()
    }
}
