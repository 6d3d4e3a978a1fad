//! Configuration for the data-fetch layer
//!
//! Everything tunable lives here: the API base URL and key (normally supplied
//! through the environment), the rate-limit budget the request queue enforces,
//! and the three named TTL tiers call sites pick from when caching responses.

use std::env;
use std::time::Duration;

/// Environment variable holding the API base URL
pub const BASE_URL_ENV: &str = "TUBEFETCH_BASE_URL";
/// Environment variable holding the optional API key
pub const API_KEY_ENV: &str = "TUBEFETCH_API_KEY";

/// Default base URL when the environment supplies none
const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Rate budget enforced by a [`crate::queue::RequestQueue`]
///
/// At most `max_requests` jobs start within any `window`; excess jobs are
/// delayed, never dropped. `spacing` is a fixed pause applied after each job
/// to smooth bursts that fit inside the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum number of requests started per window
    pub max_requests: u32,
    /// Length of the rate window
    pub window: Duration,
    /// Fixed delay applied between consecutive requests
    pub spacing: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            spacing: Duration::from_millis(100),
        }
    }
}

/// The three named cache durations call sites select per endpoint
///
/// Search-style listings go stale quickly and use [`TtlTier::Short`]; static
/// metadata like a video looked up by id uses [`TtlTier::Long`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlTiers {
    /// Fast-moving data (search results, trending feeds)
    pub short: Duration,
    /// General listings
    pub medium: Duration,
    /// Near-static metadata (video by id, channel profiles)
    pub long: Duration,
}

impl Default for TtlTiers {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(5 * 60),
            medium: Duration::from_secs(15 * 60),
            long: Duration::from_secs(60 * 60),
        }
    }
}

/// Selects one of the durations in [`TtlTiers`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlTier {
    Short,
    Medium,
    Long,
}

impl TtlTier {
    /// Resolves this tier against a set of configured durations
    pub fn duration(self, tiers: &TtlTiers) -> Duration {
        match self {
            TtlTier::Short => tiers.short,
            TtlTier::Medium => tiers.medium,
            TtlTier::Long => tiers.long,
        }
    }
}

/// Top-level configuration for an [`crate::client::ApiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all request paths are joined onto
    pub base_url: String,
    /// Optional API key appended to every request as a `key=` query parameter
    pub api_key: Option<String>,
    /// Timeout applied to each underlying HTTP request
    pub request_timeout: Duration,
    /// Rate budget for the request queue
    pub rate: RateLimitConfig,
    /// Named TTL tiers for cached GETs
    pub ttl: TtlTiers,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
            rate: RateLimitConfig::default(),
            ttl: TtlTiers::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with the given base URL and all other defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Creates a configuration from the environment
    ///
    /// Reads the base URL from `TUBEFETCH_BASE_URL` and the API key from
    /// `TUBEFETCH_API_KEY`; anything unset falls back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            if !base_url.is_empty() {
                config.base_url = base_url;
            }
        }
        if let Ok(api_key) = env::var(API_KEY_ENV) {
            if !api_key.is_empty() {
                config.api_key = Some(api_key);
            }
        }
        config
    }

    /// Sets the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the rate budget
    pub fn with_rate(mut self, rate: RateLimitConfig) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the TTL tiers
    pub fn with_ttl(mut self, ttl: TtlTiers) -> Self {
        self.ttl = ttl;
        self
    }
}
