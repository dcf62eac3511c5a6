//! Integration Tests for get_or_fetch
//!
//! Single-flight sharing, backoff timing, stale fallbacks, the rate-limit
//! cooldown, persistence across a rebuild and cancellation. Backoff waits run
//! on tokio's paused clock; TTL and cooldown read a `MockClock`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_cache::cache::{MemoryStorage, StrictClassifier};
use api_cache::clock::MockClock;
use api_cache::{ApiCache, CacheConfig, CacheError, FetchError, FetchOptions};
use futures::future::{join_all, BoxFuture, FutureExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// == Helper Functions ==

fn config(max_retries: u32, base_ms: u64) -> CacheConfig {
    CacheConfig::new("test_cache")
        .with_default_ttl(Duration::from_secs(60))
        .with_max_retries(max_retries)
        .with_base_retry_delay(Duration::from_millis(base_ms))
}

fn cache_with_clock(config: CacheConfig, clock: &MockClock) -> ApiCache {
    ApiCache::builder(config).clock(Arc::new(clock.clone())).build()
}

type FetchFn = Box<dyn Fn() -> BoxFuture<'static, Result<String, FetchError>> + Send + Sync>;

/// Fetch that counts calls, takes `latency`, then returns `value-<n>`.
fn counting_fetch(calls: &Arc<AtomicUsize>, latency: Duration) -> FetchFn {
    let calls = Arc::clone(calls);
    Box::new(move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            tokio::time::sleep(latency).await;
            Ok::<_, FetchError>(format!("value-{}", n))
        }
        .boxed()
    })
}

/// Fetch that counts calls and always fails with `error`.
fn failing_fetch(calls: &Arc<AtomicUsize>, error: FetchError) -> FetchFn {
    let calls = Arc::clone(calls);
    Box::new(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        let error = error.clone();
        async move { Err::<String, _>(error) }.boxed()
    })
}

// == Single-Flight ==

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_one_fetch() {
    let cache = ApiCache::new(config(2, 100));
    let calls = Arc::new(AtomicUsize::new(0));

    let callers = (0..10).map(|_| {
        cache.get_or_fetch::<String, _, _>(
            "user-balance-1",
            counting_fetch(&calls, Duration::from_millis(50)),
        )
    });
    let results = join_all(callers).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for result in results {
        assert_eq!(result.unwrap(), "value-1");
    }
    assert_eq!(cache.get_stats().pending_requests, 0);
    assert_eq!(cache.get::<String>("user-balance-1").as_deref(), Some("value-1"));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_one_rejection() {
    let cache = ApiCache::new(config(0, 100));
    let calls = Arc::new(AtomicUsize::new(0));

    let callers = (0..5).map(|_| {
        cache.get_or_fetch::<String, _, _>(
            "k",
            failing_fetch(&calls, FetchError::status(500, "boom")),
        )
    });
    let results = join_all(callers).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for result in results {
        match result {
            Err(CacheError::Fetch { key, source }) => {
                assert_eq!(key, "k");
                assert_eq!(source, FetchError::status(500, "boom"));
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }
    assert_eq!(cache.get_stats().pending_requests, 0);
}

#[tokio::test(start_paused = true)]
async fn test_different_keys_fetch_independently() {
    let cache = ApiCache::new(config(0, 100));
    let calls = Arc::new(AtomicUsize::new(0));

    let (a, b) = tokio::join!(
        cache.get_or_fetch::<String, _, _>("a", counting_fetch(&calls, Duration::from_millis(10))),
        cache.get_or_fetch::<String, _, _>("b", counting_fetch(&calls, Duration::from_millis(10))),
    );

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_forced_refresh_joins_in_flight_fetch() {
    let cache = ApiCache::new(config(0, 100));
    let calls = Arc::new(AtomicUsize::new(0));

    let (plain, forced) = tokio::join!(
        cache.get_or_fetch::<String, _, _>("k", counting_fetch(&calls, Duration::from_millis(20))),
        cache.get_or_fetch_with::<String, _, _>(
            "k",
            FetchOptions::default().forced(),
            counting_fetch(&calls, Duration::from_millis(20))
        ),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(plain.unwrap(), forced.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_forced_refresh_bypasses_cache() {
    let cache = ApiCache::new(config(0, 100));
    let calls = Arc::new(AtomicUsize::new(0));
    cache.set("k", &"old", None).unwrap();

    let value: String = cache
        .get_or_fetch_with(
            "k",
            FetchOptions::default().forced(),
            counting_fetch(&calls, Duration::ZERO),
        )
        .await
        .unwrap();

    assert_eq!(value, "value-1");
    assert_eq!(cache.get::<String>("k").as_deref(), Some("value-1"));
}

// == Retry Policy ==

#[tokio::test(start_paused = true)]
async fn test_backoff_sequence() {
    let cache = ApiCache::new(config(3, 1_000));
    let attempts: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));

    let recorded = Arc::clone(&attempts);
    let value: String = cache
        .get_or_fetch("wallets", move || {
            let mut times = recorded.lock().unwrap();
            times.push(Instant::now());
            let attempt = times.len();
            async move {
                if attempt <= 3 {
                    Err(FetchError::Transport("connection reset".to_string()))
                } else {
                    Ok("fourth time lucky".to_string())
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "fourth time lucky");

    let times = attempts.lock().unwrap();
    assert_eq!(times.len(), 4);
    let gaps: Vec<Duration> = times.windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(
        gaps,
        vec![
            Duration::from_millis(1_000),
            Duration::from_millis(2_000),
            Duration::from_millis(4_000)
        ]
    );

    assert_eq!(cache.get::<String>("wallets").as_deref(), Some("fourth time lucky"));
    assert!(cache.get_stats().retry_attempts.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_falls_back_to_cached_value() {
    let cache = ApiCache::new(config(2, 10));
    let calls = Arc::new(AtomicUsize::new(0));
    cache.set("k", &"v_old", None).unwrap();

    let value: String = cache
        .get_or_fetch_with(
            "k",
            FetchOptions::default().forced(),
            failing_fetch(&calls, FetchError::status(503, "unavailable")),
        )
        .await
        .unwrap();

    assert_eq!(value, "v_old");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.get_stats().retry_attempts.get("k"), Some(&2));
    assert_eq!(cache.get::<String>("k").as_deref(), Some("v_old"));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_without_cache_rejects() {
    let cache = ApiCache::new(config(2, 10));
    let calls = Arc::new(AtomicUsize::new(0));

    let result: Result<String, _> = cache
        .get_or_fetch(
            "never-cached",
            failing_fetch(&calls, FetchError::Decode("bad json".to_string())),
        )
        .await;

    assert!(matches!(
        result,
        Err(CacheError::Fetch { source: FetchError::Decode(_), .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.get::<String>("never-cached"), None);
}

#[tokio::test(start_paused = true)]
async fn test_strict_classifier_skips_retry_for_client_errors() {
    let cache = ApiCache::builder(config(3, 10))
        .classifier(Arc::new(StrictClassifier))
        .build();
    let calls = Arc::new(AtomicUsize::new(0));

    let result: Result<String, _> = cache
        .get_or_fetch("missing-user", failing_fetch(&calls, FetchError::status(404, "not found")))
        .await;

    assert!(matches!(result, Err(CacheError::Fetch { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// == Rate-Limit Guard ==

#[tokio::test(start_paused = true)]
async fn test_rate_limit_cooldown_spans_all_keys() {
    let clock = MockClock::starting_at(1_000_000);
    let cache = cache_with_clock(config(3, 10), &clock);
    let calls = Arc::new(AtomicUsize::new(0));
    cache.set("cached-key", &"still here", None).unwrap();

    let first: Result<String, _> = cache
        .get_or_fetch("a", failing_fetch(&calls, FetchError::too_many_requests()))
        .await;
    assert!(matches!(first, Err(CacheError::RateLimited(ref key)) if key == "a"));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "429 must not be retried");
    assert!(cache.get_stats().retry_attempts.is_empty());
    assert!(cache.is_rate_limited());

    // Another key during the cooldown never reaches the network
    let other = Arc::new(AtomicUsize::new(0));
    let second: Result<String, _> = cache
        .get_or_fetch("b", counting_fetch(&other, Duration::ZERO))
        .await;
    assert!(matches!(second, Err(CacheError::RateLimited(_))));
    assert_eq!(other.load(Ordering::SeqCst), 0);

    // Cached data is still served
    let cached: String = cache
        .get_or_fetch("cached-key", counting_fetch(&other, Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(cached, "still here");
    assert_eq!(other.load(Ordering::SeqCst), 0);

    // Just before the window closes it is still active
    clock.advance(Duration::from_millis(59_999));
    assert!(cache.is_rate_limited());

    clock.advance(Duration::from_millis(1));
    let after: String = cache
        .get_or_fetch("b", counting_fetch(&other, Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(after, "value-1");
    assert!(!cache.get_stats().rate_limited);
}

#[tokio::test(start_paused = true)]
async fn test_forced_refresh_ignores_cooldown() {
    let clock = MockClock::default();
    let cache = cache_with_clock(config(0, 10), &clock);
    let calls = Arc::new(AtomicUsize::new(0));

    let _ = cache
        .get_or_fetch::<String, _, _>("a", failing_fetch(&calls, FetchError::too_many_requests()))
        .await;
    assert!(cache.is_rate_limited());

    let forced: String = cache
        .get_or_fetch_with(
            "b",
            FetchOptions::default().forced(),
            counting_fetch(&calls, Duration::ZERO),
        )
        .await
        .unwrap();
    assert_eq!(forced, "value-2");
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_during_refresh_serves_cached_value() {
    let clock = MockClock::default();
    let cache = cache_with_clock(config(2, 10), &clock);
    let calls = Arc::new(AtomicUsize::new(0));
    cache.set("k", &"previous", None).unwrap();

    let value: String = cache
        .get_or_fetch_with(
            "k",
            FetchOptions::default().forced(),
            failing_fetch(&calls, FetchError::too_many_requests()),
        )
        .await
        .unwrap();

    assert_eq!(value, "previous");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(cache.is_rate_limited());
}

// == TTL and Persistence ==

#[tokio::test]
async fn test_fetched_value_honors_ttl() {
    let clock = MockClock::starting_at(0);
    let cache = cache_with_clock(config(0, 10), &clock);
    let calls = Arc::new(AtomicUsize::new(0));

    let _: String = cache
        .get_or_fetch_with(
            "tx-list",
            FetchOptions::default().with_ttl(Duration::from_millis(1_000)),
            counting_fetch(&calls, Duration::ZERO),
        )
        .await
        .unwrap();

    clock.set(999);
    assert!(cache.get::<String>("tx-list").is_some());
    clock.set(1_000);
    assert!(cache.get::<String>("tx-list").is_none());

    let refetched: String = cache
        .get_or_fetch("tx-list", counting_fetch(&calls, Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(refetched, "value-2");
}

#[tokio::test]
async fn test_rebuilt_instance_restores_from_storage() {
    let clock = MockClock::default();
    let storage = MemoryStorage::new();
    let build = || {
        ApiCache::builder(config(0, 10))
            .clock(Arc::new(clock.clone()))
            .storage(Arc::new(storage.clone()))
            .build()
    };
    let calls = Arc::new(AtomicUsize::new(0));

    let first = build();
    let _: String = first
        .get_or_fetch("dashboard-summary", counting_fetch(&calls, Duration::ZERO))
        .await
        .unwrap();
    drop(first);

    let reloaded = build();
    let value: String = reloaded
        .get_or_fetch("dashboard-summary", counting_fetch(&calls, Duration::ZERO))
        .await
        .unwrap();

    assert_eq!(value, "value-1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_type_mismatch_is_reported() {
    let cache = ApiCache::new(config(0, 10));
    cache.set("k", &"text", None).unwrap();

    let result = cache
        .get_or_fetch::<u64, _, _>("k", || async { Ok(1u64) })
        .await;

    assert!(matches!(result, Err(CacheError::Serialization(_))));
}

// == Cancellation ==

#[tokio::test(start_paused = true)]
async fn test_abandoned_fetch_is_cancelled() {
    let cache = ApiCache::new(config(0, 10));
    let seen_token: Arc<Mutex<Option<CancellationToken>>> = Arc::new(Mutex::new(None));

    let slot = Arc::clone(&seen_token);
    let abandoned = tokio::time::timeout(
        Duration::from_millis(10),
        cache.get_or_fetch_cancellable::<String, _, _>(
            "slow",
            FetchOptions::default(),
            move |token| {
                *slot.lock().unwrap() = Some(token);
                async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("too late".to_string())
                }
            },
        ),
    )
    .await;
    assert!(abandoned.is_err(), "caller should have timed out");

    let token = seen_token.lock().unwrap().clone().expect("fetch was started");
    assert!(token.is_cancelled());
    assert_eq!(cache.get_stats().pending_requests, 0);

    // The next caller starts a fresh fetch instead of joining the dead one
    let calls = Arc::new(AtomicUsize::new(0));
    let value: String = cache
        .get_or_fetch("slow", counting_fetch(&calls, Duration::from_millis(5)))
        .await
        .unwrap();
    assert_eq!(value, "value-1");
}

#[tokio::test(start_paused = true)]
async fn test_remaining_waiter_unaffected_by_dropped_caller() {
    let cache = ApiCache::new(config(0, 10));
    let calls = Arc::new(AtomicUsize::new(0));

    let impatient = tokio::time::timeout(
        Duration::from_millis(10),
        cache.get_or_fetch::<String, _, _>("k", counting_fetch(&calls, Duration::from_millis(100))),
    );
    let patient =
        cache.get_or_fetch::<String, _, _>("k", counting_fetch(&calls, Duration::from_millis(100)));

    let (impatient, patient) = tokio::join!(impatient, patient);

    assert!(impatient.is_err());
    assert_eq!(patient.unwrap(), "value-1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_pending_rejects_waiters() {
    let cache = ApiCache::new(config(0, 10));
    let calls = Arc::new(AtomicUsize::new(0));

    let waiter =
        cache.get_or_fetch::<String, _, _>("k", counting_fetch(&calls, Duration::from_secs(60)));
    let canceller = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.cancel_pending("k")
    };

    let (result, cancelled) = tokio::join!(waiter, canceller);

    assert!(cancelled);
    assert!(matches!(result, Err(CacheError::Cancelled(ref key)) if key == "k"));
    assert_eq!(cache.get::<String>("k"), None);
}

#[tokio::test(start_paused = true)]
async fn test_clear_resets_instance() {
    let cache = ApiCache::new(config(0, 10));
    let calls = Arc::new(AtomicUsize::new(0));
    let _: String = cache
        .get_or_fetch("a", counting_fetch(&calls, Duration::ZERO))
        .await
        .unwrap();

    cache.clear();

    let stats = cache.get_stats();
    assert_eq!(stats.cache_size, 0);
    assert_eq!(stats.pending_requests, 0);
    assert_eq!(cache.get::<String>("a"), None);
}
