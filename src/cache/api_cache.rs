//! API Cache Module
//!
//! The request cache every data-fetching call goes through. Combines the
//! entry store, persistence, single-flight coordination, retry with backoff
//! and the rate-limit cooldown for one isolated instance.
//!
//! # Locking
//! All maps of an instance live behind one `std::sync::Mutex` that is never
//! held across an `.await`. A fetch is registered as pending before its task
//! is polled and removed by that task before its result reaches any waiter,
//! so a caller arriving mid-flight always joins instead of refetching.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::config::CacheConfig;
use crate::cache::persistence::{NoopStorage, PersistenceAdapter, Storage};
use crate::cache::rate_limit::RateLimitGuard;
use crate::cache::retry::{DefaultClassifier, ErrorClass, ErrorClassifier, RetryPolicy};
use crate::cache::store::{CacheStore, Lookup};
use crate::cache::{CacheEntry, CacheStats};
use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, FetchError, Result};

type SharedFetch = Shared<BoxFuture<'static, Result<Value>>>;

// == Fetch Options ==
/// Per-call overrides for `get_or_fetch_with`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// TTL for the fetched value, instance default when `None`
    pub ttl: Option<Duration>,
    /// Skip the cache read and the rate-limit cooldown
    pub force_refresh: bool,
}

impl FetchOptions {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn forced(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

// == Internal State ==
/// One in-flight fetch shared by every caller of the same key.
struct Flight {
    id: u64,
    result: SharedFetch,
    waiters: usize,
    token: CancellationToken,
}

struct CacheState {
    store: CacheStore,
    pending: HashMap<String, Flight>,
    rate_limit: RateLimitGuard,
    next_flight_id: u64,
}

struct Inner {
    config: CacheConfig,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    classifier: Arc<dyn ErrorClassifier>,
    persistence: PersistenceAdapter,
    state: Mutex<CacheState>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Store read that also drops the persisted copy of an expired entry.
    fn lookup_locked(&self, state: &mut CacheState, key: &str, now_ms: u64) -> Option<Value> {
        match state.store.get(key, now_ms) {
            Lookup::Hit(value) => Some(value),
            Lookup::Expired => {
                debug!(cache = %self.config.namespace, key, "Evicted expired entry");
                self.persistence.remove(key);
                None
            }
            Lookup::Miss => None,
        }
    }

    fn cached(&self, key: &str) -> Option<Value> {
        let now = self.now();
        let mut state = self.lock();
        self.lookup_locked(&mut state, key, now)
    }

    /// The medium is written after the state lock is released.
    fn store_value(&self, key: &str, data: Value, ttl: Option<Duration>) {
        let entry = CacheEntry::new(data, self.now(), ttl.unwrap_or(self.config.default_ttl));
        self.lock().store.insert(key, entry.clone());
        self.persistence.save(key, &entry);
    }

    fn trigger_rate_limit(&self) {
        let now = self.now();
        self.lock().rate_limit.handle_rate_limit(now);
    }

    /// Drops the registry slot of flight `id`, if it still owns it.
    fn finish_flight(&self, key: &str, id: u64) {
        let mut state = self.lock();
        if state.pending.get(key).map(|flight| flight.id) == Some(id) {
            state.pending.remove(key);
        }
    }

    /// A waiter went away. The last one to leave cancels the fetch.
    fn release_waiter(&self, key: &str, id: u64) {
        let mut state = self.lock();
        let abandoned = match state.pending.get_mut(key) {
            Some(flight) if flight.id == id => {
                flight.waiters = flight.waiters.saturating_sub(1);
                flight.waiters == 0
            }
            _ => false,
        };

        if abandoned {
            if let Some(flight) = state.pending.remove(key) {
                flight.token.cancel();
                debug!(cache = %self.config.namespace, key, "All callers gone, cancelled fetch");
            }
        }
    }

    // == Execute With Retry ==
    /// Runs `fetch` until it succeeds, the budget is spent, or a rate-limit
    /// signal arrives. Failures resolve to cached data when there is any.
    async fn execute_with_retry<T, F, Fut>(
        &self,
        key: &str,
        fetch: &F,
        ttl: Option<Duration>,
        token: &CancellationToken,
    ) -> Result<Value>
    where
        T: Serialize,
        F: Fn(CancellationToken) -> Fut,
        Fut: Future<Output = std::result::Result<T, FetchError>>,
    {
        let namespace = self.config.namespace.as_str();
        let mut attempt: u32 = 0;

        loop {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(CacheError::Cancelled(key.to_string())),
                outcome = fetch(token.clone()) => outcome,
            };

            let failure = match outcome {
                Ok(value) => {
                    let data = serde_json::to_value(&value)?;
                    self.store_value(key, data.clone(), ttl);
                    info!(cache = namespace, key, attempt, "Fetched and cached");
                    return Ok(data);
                }
                Err(failure) => failure,
            };

            match self.classifier.classify(&failure) {
                ErrorClass::RateLimit => {
                    self.trigger_rate_limit();
                    warn!(
                        cache = namespace,
                        key,
                        "Rate limited by backend, cooling down for {:?}",
                        self.config.rate_limit_cooldown
                    );
                    return self
                        .cached(key)
                        .ok_or_else(|| CacheError::RateLimited(key.to_string()));
                }
                ErrorClass::Retry if self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    attempt += 1;
                    self.lock().store.record_retry(key, attempt);
                    warn!(
                        cache = namespace,
                        key,
                        attempt,
                        "Fetch failed ({}), retrying in {:?}",
                        failure,
                        delay
                    );

                    tokio::select! {
                        biased;
                        _ = token.cancelled() => return Err(CacheError::Cancelled(key.to_string())),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                _ => {
                    return match self.cached(key) {
                        Some(stale) => {
                            warn!(
                                cache = namespace,
                                key,
                                "Fetch failed ({}), serving cached value",
                                failure
                            );
                            Ok(stale)
                        }
                        None => {
                            error!(
                                cache = namespace,
                                key,
                                attempt,
                                "Fetch failed with nothing cached: {}",
                                failure
                            );
                            Err(CacheError::Fetch {
                                key: key.to_string(),
                                source: failure,
                            })
                        }
                    };
                }
            }
        }
    }
}

/// Decrements the flight's waiter count when a caller stops waiting.
struct WaiterGuard {
    inner: Arc<Inner>,
    key: String,
    id: u64,
}

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        self.inner.release_waiter(&self.key, self.id);
    }
}

/// Clears the registry slot when the fetch task ends, even on panic.
struct FlightCleanup {
    inner: Arc<Inner>,
    key: String,
    id: u64,
}

impl Drop for FlightCleanup {
    fn drop(&mut self) {
        self.inner.finish_flight(&self.key, self.id);
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|err| CacheError::Serialization(format!("cached value for '{}': {}", key, err)))
}

// == Api Cache ==
/// Handle to one cache instance. Clones share the same instance.
#[derive(Clone)]
pub struct ApiCache {
    inner: Arc<Inner>,
}

/// Builder for `ApiCache`.
pub struct ApiCacheBuilder {
    config: CacheConfig,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    classifier: Arc<dyn ErrorClassifier>,
}

impl ApiCacheBuilder {
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Builds the instance and restores its live persisted entries.
    pub fn build(self) -> ApiCache {
        let persistence = PersistenceAdapter::new(self.storage, self.config.namespace.clone());
        let mut store = CacheStore::new();
        let restored = persistence.load(self.clock.now_ms());
        if !restored.is_empty() {
            info!(
                cache = %self.config.namespace,
                "Restored {} persisted entries",
                restored.len()
            );
        }
        for (key, entry) in restored {
            store.restore(key, entry);
        }

        let state = CacheState {
            store,
            pending: HashMap::new(),
            rate_limit: RateLimitGuard::new(self.config.rate_limit_cooldown),
            next_flight_id: 0,
        };

        ApiCache {
            inner: Arc::new(Inner {
                retry: self.config.retry_policy(),
                config: self.config,
                clock: self.clock,
                classifier: self.classifier,
                persistence,
                state: Mutex::new(state),
            }),
        }
    }
}

impl ApiCache {
    // == Constructors ==
    /// Instance without a persistence medium.
    pub fn new(config: CacheConfig) -> Self {
        Self::builder(config).build()
    }

    /// Instance mirrored to `storage`.
    pub fn with_storage(config: CacheConfig, storage: Arc<dyn Storage>) -> Self {
        Self::builder(config).storage(storage).build()
    }

    pub fn builder(config: CacheConfig) -> ApiCacheBuilder {
        ApiCacheBuilder {
            config,
            storage: Arc::new(NoopStorage),
            clock: Arc::new(SystemClock),
            classifier: Arc::new(DefaultClassifier),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.config.namespace
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    // == Get ==
    /// Returns the live cached value, evicting it (memory and persisted) if expired.
    /// A value that does not decode as `T` is reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        match decode(key, value) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(cache = %self.name(), key, "{}", err);
                None
            }
        }
    }

    /// Raw JSON form of `get`.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.inner.cached(key)
    }

    // == Set ==
    /// Stores `data`, replacing any previous entry, persists it and resets
    /// the key's retry counter.
    pub fn set<T: Serialize>(&self, key: &str, data: &T, ttl: Option<Duration>) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.set_value(key, value, ttl);
        Ok(())
    }

    pub fn set_value(&self, key: &str, data: Value, ttl: Option<Duration>) {
        self.inner.store_value(key, data, ttl);
    }

    // == Get Or Fetch ==
    /// Cached value for `key`, or the result of `fetch` with default options.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, FetchError>> + Send + 'static,
    {
        self.get_or_fetch_with(key, FetchOptions::default(), fetch).await
    }

    /// `get_or_fetch` with an explicit TTL and/or forced refresh.
    pub async fn get_or_fetch_with<T, F, Fut>(
        &self,
        key: &str,
        options: FetchOptions,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, FetchError>> + Send + 'static,
    {
        self.get_or_fetch_cancellable(key, options, move |_| fetch()).await
    }

    /// Full entry point. `fetch` receives the flight's cancellation token,
    /// which fires once every caller waiting on the flight has gone away.
    ///
    /// Order of checks: rate-limit cooldown, cache, in-flight fetch, new fetch.
    /// `force_refresh` skips the first two but still joins an in-flight fetch.
    pub async fn get_or_fetch_cancellable<T, F, Fut>(
        &self,
        key: &str,
        options: FetchOptions,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, FetchError>> + Send + 'static,
    {
        let (flight, _waiter) = {
            let now = self.inner.now();
            let mut state = self.inner.lock();

            if !options.force_refresh && state.rate_limit.is_rate_limited(now) {
                return match self.inner.lookup_locked(&mut state, key, now) {
                    Some(value) => {
                        debug!(cache = %self.name(), key, "Cooldown active, serving cached value");
                        decode(key, value)
                    }
                    None => {
                        warn!(cache = %self.name(), key, "Cooldown active and nothing cached");
                        Err(CacheError::RateLimited(key.to_string()))
                    }
                };
            }

            if !options.force_refresh {
                if let Some(value) = self.inner.lookup_locked(&mut state, key, now) {
                    debug!(cache = %self.name(), key, "Cache hit");
                    return decode(key, value);
                }
            }

            let joined = state.pending.get_mut(key).map(|flight| {
                flight.waiters += 1;
                (flight.result.clone(), flight.id)
            });

            let (result, id) = match joined {
                Some(joined) => {
                    debug!(cache = %self.name(), key, "Joined in-flight fetch");
                    joined
                }
                None => self.start_flight(&mut state, key, options.ttl, fetch),
            };

            let waiter = WaiterGuard {
                inner: Arc::clone(&self.inner),
                key: key.to_string(),
                id,
            };
            (result, waiter)
        };

        let value = flight.await?;
        decode(key, value)
    }

    /// Spawns the fetch task and registers it. Caller holds the state lock.
    fn start_flight<T, F, Fut>(
        &self,
        state: &mut CacheState,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> (SharedFetch, u64)
    where
        T: Serialize + Send + 'static,
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, FetchError>> + Send + 'static,
    {
        let id = state.next_flight_id;
        state.next_flight_id += 1;
        debug!(cache = %self.name(), key, id, "Starting fetch");

        let token = CancellationToken::new();
        let task_token = token.clone();
        let inner = Arc::clone(&self.inner);
        let task_key = key.to_string();

        let handle = tokio::spawn(async move {
            let _cleanup = FlightCleanup {
                inner: Arc::clone(&inner),
                key: task_key.clone(),
                id,
            };
            inner
                .execute_with_retry(&task_key, &fetch, ttl, &task_token)
                .await
        });

        let failed_key = key.to_string();
        let result = async move {
            match handle.await {
                Ok(result) => result,
                Err(err) => Err(CacheError::Internal(format!(
                    "fetch task for '{}' failed: {}",
                    failed_key, err
                ))),
            }
        }
        .boxed()
        .shared();

        state.pending.insert(
            key.to_string(),
            Flight {
                id,
                result: result.clone(),
                waiters: 1,
                token,
            },
        );

        (result, id)
    }

    // == Invalidate ==
    /// Removes one entry from memory and storage, with its retry counter.
    pub fn invalidate(&self, key: &str) {
        self.inner.lock().store.remove(key);
        self.inner.persistence.remove(key);
        debug!(cache = %self.name(), key, "Invalidated");
    }

    // == Clear ==
    /// Drops every entry, pending registration and retry counter of this
    /// instance, and its whole persisted namespace. Fetches already running
    /// still resolve the callers waiting on them.
    pub fn clear(&self) {
        {
            let mut state = self.inner.lock();
            state.store.clear();
            state.pending.clear();
        }
        self.inner.persistence.clear();
        info!(cache = %self.name(), "Cleared");
    }

    /// Aborts the in-flight fetch for `key`. Its waiters get `Cancelled`.
    pub fn cancel_pending(&self, key: &str) -> bool {
        let flight = self.inner.lock().pending.remove(key);
        match flight {
            Some(flight) => {
                flight.token.cancel();
                info!(cache = %self.name(), key, "Cancelled in-flight fetch");
                true
            }
            None => false,
        }
    }

    // == Cleanup Expired ==
    /// Sweeps expired entries out of memory and storage. Returns how many.
    pub fn purge_expired(&self) -> usize {
        let now = self.inner.now();
        let expired = self.inner.lock().store.purge_expired(now);
        for key in &expired {
            self.inner.persistence.remove(key);
        }
        expired.len()
    }

    pub fn is_rate_limited(&self) -> bool {
        let now = self.inner.now();
        self.inner.lock().rate_limit.is_rate_limited(now)
    }

    // == Stats ==
    pub fn get_stats(&self) -> CacheStats {
        let now = self.inner.now();
        let state = self.inner.lock();
        CacheStats {
            name: self.inner.config.namespace.clone(),
            cache_size: state.store.len(),
            pending_requests: state.pending.len(),
            retry_attempts: state.store.retry_attempts(),
            rate_limited: state.rate_limit.is_rate_limited(now),
            hits: state.store.hits(),
            misses: state.store.misses(),
        }
    }

    /// Keys currently held in memory, unordered.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().store.keys()
    }
}

impl fmt::Debug for ApiCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCache")
            .field("config", &self.inner.config)
            .field("persistence", &self.inner.persistence)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::persistence::MemoryStorage;
    use crate::clock::MockClock;
    use serde_json::json;

    fn test_cache(clock: &MockClock) -> ApiCache {
        ApiCache::builder(CacheConfig::new("test").with_default_ttl(Duration::from_millis(1_000)))
            .clock(Arc::new(clock.clone()))
            .build()
    }

    #[test]
    fn test_set_and_get() {
        let cache = test_cache(&MockClock::default());

        cache.set("user-1", &json!({"name": "Ada"}), None).unwrap();

        let value: Value = cache.get("user-1").unwrap();
        assert_eq!(value["name"], "Ada");
    }

    #[test]
    fn test_get_wrong_type_is_a_miss() {
        let cache = test_cache(&MockClock::default());
        cache.set("n", &"not a number", None).unwrap();

        assert_eq!(cache.get::<u64>("n"), None);
        assert_eq!(cache.get::<String>("n").as_deref(), Some("not a number"));
    }

    #[test]
    fn test_ttl_window() {
        let clock = MockClock::starting_at(10_000);
        let storage = MemoryStorage::new();
        let cache = ApiCache::builder(CacheConfig::new("ttl"))
            .clock(Arc::new(clock.clone()))
            .storage(Arc::new(storage.clone()))
            .build();

        cache.set("k", &"v", Some(Duration::from_millis(1_000))).unwrap();

        clock.set(10_999);
        assert_eq!(cache.get::<String>("k").as_deref(), Some("v"));

        clock.set(11_000);
        assert_eq!(cache.get::<String>("k"), None);
        assert_eq!(cache.get_stats().cache_size, 0);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_invalidate_removes_persisted_copy() {
        let storage = MemoryStorage::new();
        let cache = ApiCache::with_storage(CacheConfig::new("inv"), Arc::new(storage.clone()));

        cache.set("k", &1, None).unwrap();
        assert_eq!(storage.len(), 1);

        cache.invalidate("k");
        cache.invalidate("k");

        assert_eq!(cache.get::<i32>("k"), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = test_cache(&MockClock::default());
        cache.set("a", &1, None).unwrap();
        cache.set("b", &2, None).unwrap();

        cache.clear();

        assert_eq!(cache.get_stats().cache_size, 0);
        assert_eq!(cache.get::<i32>("a"), None);
        assert_eq!(cache.get::<i32>("b"), None);
    }

    #[test]
    fn test_purge_expired() {
        let clock = MockClock::starting_at(0);
        let cache = test_cache(&clock);
        cache.set("short", &1, Some(Duration::from_millis(10))).unwrap();
        cache.set("long", &2, Some(Duration::from_secs(10))).unwrap();

        clock.set(100);

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.keys(), vec!["long".to_string()]);
    }

    #[test]
    fn test_stats_snapshot() {
        let cache = test_cache(&MockClock::default());
        cache.set("a", &1, None).unwrap();
        let _ = cache.get::<i32>("a");
        let _ = cache.get::<i32>("missing");

        let stats = cache.get_stats();
        assert_eq!(stats.name, "test");
        assert_eq!(stats.cache_size, 1);
        assert_eq!(stats.pending_requests, 0);
        assert!(!stats.rate_limited);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_hit_skips_fetch() {
        let cache = test_cache(&MockClock::default());
        cache.set("k", &"cached", None).unwrap();

        let value: String = cache
            .get_or_fetch("k", || async { Err(FetchError::Other("must not run".to_string())) })
            .await
            .unwrap();

        assert_eq!(value, "cached");
    }

    #[tokio::test]
    async fn test_get_or_fetch_caches_result() {
        let cache = test_cache(&MockClock::default());

        let value: u32 = cache.get_or_fetch("k", || async { Ok(7u32) }).await.unwrap();

        assert_eq!(value, 7);
        assert_eq!(cache.get::<u32>("k"), Some(7));
        assert_eq!(cache.get_stats().pending_requests, 0);
    }

    #[tokio::test]
    async fn test_cancel_pending_without_flight() {
        let cache = test_cache(&MockClock::default());
        assert!(!cache.cancel_pending("nothing"));
    }

    /// Medium that reads the owning cache's stats on every write.
    struct ReentrantStorage {
        inner: MemoryStorage,
        cache: std::sync::OnceLock<ApiCache>,
        sizes_seen: Mutex<Vec<usize>>,
    }

    impl Storage for ReentrantStorage {
        fn read(&self, key: &str) -> Result<Option<String>> {
            self.inner.read(key)
        }
        fn write(&self, key: &str, value: &str) -> Result<()> {
            if let Some(cache) = self.cache.get() {
                let size = cache.get_stats().cache_size;
                self.sizes_seen.lock().unwrap().push(size);
            }
            self.inner.write(key, value)
        }
        fn remove(&self, key: &str) -> Result<()> {
            if let Some(cache) = self.cache.get() {
                cache.get_stats();
            }
            self.inner.remove(key)
        }
        fn keys(&self) -> Result<Vec<String>> {
            self.inner.keys()
        }
    }

    #[tokio::test]
    async fn test_storage_is_written_outside_the_state_lock() {
        let storage = Arc::new(ReentrantStorage {
            inner: MemoryStorage::new(),
            cache: std::sync::OnceLock::new(),
            sizes_seen: Mutex::new(Vec::new()),
        });
        let cache = ApiCache::with_storage(CacheConfig::new("reentrant"), storage.clone());
        storage.cache.set(cache.clone()).unwrap();

        cache.set("a", &1, None).unwrap();
        let fetched: u32 = cache.get_or_fetch("b", || async { Ok(2u32) }).await.unwrap();
        cache.invalidate("a");
        cache.clear();

        assert_eq!(fetched, 2);
        assert_eq!(*storage.sizes_seen.lock().unwrap(), vec![1, 2]);
        assert!(storage.inner.is_empty());
    }
}
