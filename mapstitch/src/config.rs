//! Fetch pipeline configuration.
//!
//! All tunables are threaded explicitly into the components that use them;
//! there is no ambient global state.

use std::time::Duration;

/// Default cap on simultaneous in-flight tile requests.
pub const DEFAULT_CONCURRENT_FETCHES: usize = 64;

/// Default total timeout for a single tile request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the tile fetch pipeline.
///
/// Passed to the HTTP client (timeout) and the concurrency limiter
/// (permit capacity) at construction time.
///
/// # Example
///
/// ```
/// use mapstitch::config::FetchConfig;
///
/// let config = FetchConfig::new()
///     .with_concurrency(16)
///     .with_timeout_secs(10);
/// assert_eq!(config.concurrency(), 16);
/// ```
#[derive(Debug, Clone)]
pub struct FetchConfig {
    concurrency: usize,
    timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENT_FETCHES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FetchConfig {
    /// Create a configuration with the default concurrency and timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of simultaneous tile requests (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the total per-request timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Maximum number of simultaneous tile requests.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Total timeout applied to each tile request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
