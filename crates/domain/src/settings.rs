//! Client Settings Domain Model
//!
//! Defines the tunables of the API client and its refresh retry policy.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounded retry policy for the token refresh call.
///
/// The delay after a failed attempt `n` (1-based) is `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, at least 1.
    pub max_attempts: u32,
    /// Base delay multiplied by the attempt number.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is raised to 1 if zero.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Returns the delay to wait after the given failed attempt.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Settings of the API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL every relative request path is resolved against.
    pub base_url: String,
    /// Default request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Maximum refresh attempts.
    pub refresh_max_attempts: u32,
    /// Base refresh backoff in milliseconds.
    pub refresh_base_delay_ms: u64,
    /// Session file location; the platform default is used when unset.
    pub storage_path: Option<PathBuf>,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_timeout_ms: 30_000,
            refresh_max_attempts: 3,
            refresh_base_delay_ms: 500,
            storage_path: None,
            user_agent: concat!("Prepdesk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientSettings {
    /// Returns the refresh retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.refresh_max_attempts,
            Duration::from_millis(self.refresh_base_delay_ms),
        )
    }

    /// Returns the default request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
