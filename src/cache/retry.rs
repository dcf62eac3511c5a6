//! Retry Policy Module
//!
//! Exponential backoff schedule and classification of fetch failures.

use std::time::Duration;

use crate::error::FetchError;

// == Error Class ==
/// What the cache should do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Backend is throttling: start the instance-wide cooldown, no retry
    RateLimit,
    /// Transient: retry with backoff while budget remains
    Retry,
    /// Not worth retrying: fall back to cached data or fail now
    Fail,
}

/// Decides how a fetch failure is handled.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: &FetchError) -> ErrorClass;
}

/// HTTP 429 cools down, everything else is retried.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl ErrorClassifier for DefaultClassifier {
    fn classify(&self, error: &FetchError) -> ErrorClass {
        if error.is_rate_limit() {
            ErrorClass::RateLimit
        } else {
            ErrorClass::Retry
        }
    }
}

/// Like `DefaultClassifier`, but client errors (4xx other than 429) and
/// configuration failures are not retried.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictClassifier;

impl ErrorClassifier for StrictClassifier {
    fn classify(&self, error: &FetchError) -> ErrorClass {
        match error {
            e if e.is_rate_limit() => ErrorClass::RateLimit,
            FetchError::Status { status, .. } if (400..500).contains(status) => ErrorClass::Fail,
            FetchError::Configuration(_) => ErrorClass::Fail,
            _ => ErrorClass::Retry,
        }
    }
}

// == Retry Policy ==
/// Bounded retry budget with `base * 2^attempt` delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Optional ceiling on a single delay; `None` keeps growth unbounded
    pub max_delay: Option<Duration>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: None,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Whether another retry is allowed after `attempt` failures.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    // == Backoff ==
    /// Delay to wait after failed attempt number `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}
