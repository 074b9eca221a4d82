//! Cache configuration and builder.
//!
//! Limits default to unbounded; deferred destruction defaults to on, so
//! evicted payloads are dropped off the caller's thread whenever a runtime
//! is available.

use std::time::Duration;

use thiserror::Error;

/// Default interval between automatic trim passes (30 minutes).
pub const DEFAULT_AUTO_TRIM_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Configuration validation error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The automatic trim interval was zero.
    #[error("auto-trim interval must be non-zero")]
    ZeroAutoTrimInterval,
}

/// Configuration for a [`PageCache`](crate::PageCache).
///
/// `count_limit: Some(0)` and `age_limit: Some(Duration::ZERO)` are valid
/// degenerate settings (every entry is immediately evictable), not errors.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries (None = unlimited).
    pub count_limit: Option<usize>,

    /// Maximum time since an entry's last access (None = unlimited).
    pub age_limit: Option<Duration>,

    /// Interval between automatic trim passes.
    pub auto_trim_interval: Duration,

    /// Whether evicted payloads are destroyed on a background task.
    pub defer_destruction: bool,

    /// Whether to collect access metrics.
    pub track_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            count_limit: None,
            age_limit: None,
            auto_trim_interval: DEFAULT_AUTO_TRIM_INTERVAL,
            defer_destruction: true,
            track_metrics: false,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for a count-limited cache.
    ///
    /// # Example
    /// ```
    /// use pagecache::CacheConfig;
    ///
    /// let config = CacheConfig::count_limited(8);
    /// assert_eq!(config.count_limit, Some(8));
    /// ```
    pub fn count_limited(count_limit: usize) -> Self {
        Self { count_limit: Some(count_limit), ..Self::default() }
    }

    /// Quick preset for an age-limited cache.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use pagecache::CacheConfig;
    ///
    /// let config = CacheConfig::age_limited(Duration::from_secs(300));
    /// ```
    pub fn age_limited(age_limit: Duration) -> Self {
        Self { age_limit: Some(age_limit), ..Self::default() }
    }

    /// Check the configuration for values the cache cannot honor.
    ///
    /// A zero `auto_trim_interval` cannot drive a periodic task; the cache
    /// treats it as "auto-trim disabled", but callers that consider it a bug
    /// can surface it through this check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auto_trim_interval.is_zero() {
            return Err(ConfigError::ZeroAutoTrimInterval);
        }
        Ok(())
    }
}

/// Builder for [`CacheConfig`] with a fluent API.
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries.
    pub fn count_limit(mut self, limit: usize) -> Self {
        self.config.count_limit = Some(limit);
        self
    }

    /// Set the maximum time since last access.
    pub fn age_limit(mut self, limit: Duration) -> Self {
        self.config.age_limit = Some(limit);
        self
    }

    /// Set the interval between automatic trim passes.
    pub fn auto_trim_interval(mut self, interval: Duration) -> Self {
        self.config.auto_trim_interval = interval;
        self
    }

    /// Enable or disable deferred payload destruction.
    pub fn defer_destruction(mut self, defer: bool) -> Self {
        self.config.defer_destruction = defer;
        self
    }

    /// Enable or disable metrics tracking.
    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
