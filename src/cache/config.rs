//! Cache Instance Configuration
//!
//! Per-instance TTL and retry parameters, plus the presets the registry
//! builds its instances from.

use std::time::Duration;

use crate::cache::rate_limit::DEFAULT_COOLDOWN;
use crate::cache::retry::RetryPolicy;

/// Settings for one `ApiCache` instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Persistence namespace, also the instance name in diagnostics
    pub namespace: String,
    /// TTL used when `set` or `get_or_fetch` is called without one
    pub default_ttl: Duration,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further retry
    pub base_retry_delay: Duration,
    /// Optional ceiling on a single backoff delay
    pub max_retry_delay: Option<Duration>,
    /// Window during which no fetch starts after a rate-limit signal
    pub rate_limit_cooldown: Duration,
}

impl CacheConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_retry_delay(mut self, delay: Duration) -> Self {
        self.base_retry_delay = delay;
        self
    }

    pub fn with_max_retry_delay(mut self, delay: Duration) -> Self {
        self.max_retry_delay = Some(delay);
        self
    }

    pub fn with_rate_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: self.base_retry_delay,
            max_delay: self.max_retry_delay,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: CacheProfile::General.namespace().to_string(),
            default_ttl: Duration::from_secs(3 * 60),
            max_retries: 2,
            base_retry_delay: Duration::from_secs(2),
            max_retry_delay: None,
            rate_limit_cooldown: DEFAULT_COOLDOWN,
        }
    }
}

// == Profiles ==
/// The instances every deployment provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheProfile {
    /// Catch-all for API reads
    General,
    /// Dashboard summaries
    Dashboard,
    /// Wallet balances, which change less often
    Wallet,
    /// Transaction lists, the most dynamic data
    Transactions,
}

impl CacheProfile {
    pub const ALL: [CacheProfile; 4] = [
        CacheProfile::General,
        CacheProfile::Dashboard,
        CacheProfile::Wallet,
        CacheProfile::Transactions,
    ];

    /// Short name used in the diagnostics API.
    pub fn name(self) -> &'static str {
        match self {
            CacheProfile::General => "general",
            CacheProfile::Dashboard => "dashboard",
            CacheProfile::Wallet => "wallet",
            CacheProfile::Transactions => "transactions",
        }
    }

    /// Persistence namespace. None of these plus `_` prefixes another.
    pub fn namespace(self) -> &'static str {
        match self {
            CacheProfile::General => "api_cache",
            CacheProfile::Dashboard => "dashboard_cache",
            CacheProfile::Wallet => "wallet_cache",
            CacheProfile::Transactions => "transaction_cache",
        }
    }

    pub fn default_ttl(self) -> Duration {
        match self {
            CacheProfile::General => Duration::from_secs(3 * 60),
            CacheProfile::Dashboard => Duration::from_secs(2 * 60),
            CacheProfile::Wallet => Duration::from_secs(5 * 60),
            CacheProfile::Transactions => Duration::from_secs(60),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|profile| profile.name() == name)
    }

    pub fn config(self) -> CacheConfig {
        CacheConfig::new(self.namespace()).with_default_ttl(self.default_ttl())
    }
}
