//! Bounded retry with exponential backoff
//!
//! Wraps one logical operation (a page request) and retries it only when it
//! fails with a transient error. After the last attempt the original error is
//! returned unchanged.

use crate::config::ClientSettings;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for page requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Backoff multiplier
    pub multiplier: u32,
    /// Lower bound of a wait, in units
    pub min_wait: u32,
    /// Upper bound of a wait, in units
    pub max_wait: u32,
    /// Length of one wait unit
    pub unit: Duration,
    /// Whether 4xx responses are retried like other transient failures
    pub retry_client_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 1,
            min_wait: 2,
            max_wait: 10,
            unit: Duration::from_secs(1),
            retry_client_errors: true,
        }
    }
}

impl RetryPolicy {
    /// Create the default policy (3 attempts, waits between 2 and 10 seconds)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a policy whose attempt count comes from client settings
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            max_attempts: settings.max_retries.max(1),
            ..Self::default()
        }
    }

    /// Set the attempt count
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the wait unit
    #[must_use]
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Choose whether 4xx responses are retried
    #[must_use]
    pub fn with_retry_client_errors(mut self, retry: bool) -> Self {
        self.retry_client_errors = retry;
        self
    }

    /// Wait after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = 2u32.saturating_pow(attempt.saturating_sub(1));
        let units = self
            .multiplier
            .saturating_mul(exp)
            .clamp(self.min_wait, self.max_wait.max(self.min_wait));
        self.unit * units
    }

    /// Whether an error may be retried under this policy
    pub fn should_retry(&self, error: &Error) -> bool {
        if !error.is_transient() {
            return false;
        }
        self.retry_client_errors || !error.is_client_error()
    }

    /// Run an operation with retries
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Operation succeeded after {attempt} attempts");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !self.should_retry(&error) {
                        debug!("Non-retryable error: {error}");
                        return Err(error);
                    }
                    if attempt >= self.max_attempts {
                        warn!(
                            "Giving up after {} attempts. Last error: {}",
                            self.max_attempts, error
                        );
                        return Err(error);
                    }

                    let delay = self.delay_for(attempt);
                    if error.is_client_error() {
                        warn!("Retrying client error, which is unlikely to be transient: {error}");
                    }
                    warn!(
                        "Attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, self.max_attempts, error, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
