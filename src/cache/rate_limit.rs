//! Rate-Limit Guard Module
//!
//! Instance-wide cooldown started by any HTTP 429 signal.

use std::time::Duration;

/// Default cooldown after a rate-limit signal.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

// == Rate Limit Guard ==
/// Single timestamp shared by every key of one cache instance.
#[derive(Debug, Clone)]
pub struct RateLimitGuard {
    last_rate_limit_ms: Option<u64>,
    cooldown: Duration,
}

impl RateLimitGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            last_rate_limit_ms: None,
            cooldown,
        }
    }

    /// True while `now - last signal < cooldown`.
    pub fn is_rate_limited(&self, now_ms: u64) -> bool {
        match self.last_rate_limit_ms {
            Some(last) => now_ms.saturating_sub(last) < self.cooldown.as_millis() as u64,
            None => false,
        }
    }

    /// Records a rate-limit signal observed at `now_ms`.
    pub fn handle_rate_limit(&mut self, now_ms: u64) {
        self.last_rate_limit_ms = Some(now_ms);
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for RateLimitGuard {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_until_signalled() {
        let guard = RateLimitGuard::default();
        assert!(!guard.is_rate_limited(0));
        assert!(!guard.is_rate_limited(u64::MAX));
    }

    #[test]
    fn test_cooldown_window() {
        let mut guard = RateLimitGuard::default();
        guard.handle_rate_limit(10_000);

        assert!(guard.is_rate_limited(10_000));
        assert!(guard.is_rate_limited(69_999));
        assert!(!guard.is_rate_limited(70_000));
    }

    #[test]
    fn test_new_signal_restarts_window() {
        let mut guard = RateLimitGuard::new(Duration::from_millis(100));
        guard.handle_rate_limit(0);
        guard.handle_rate_limit(90);

        assert!(guard.is_rate_limited(150));
        assert!(!guard.is_rate_limited(190));
    }
}
