// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Retry with exponential backoff.
//!
//! [`RetryPolicy::execute`] drives an operation through up to
//! `max_retries + 1` attempts. The backoff formula is:
//!
//! ```text
//! delay = min(initial_delay * multiplier^attempt, max_delay)
//! ```
//!
//! A rate-limit rejection that carries a server-specified retry-after
//! duration overrides the computed delay with that duration. Fatal failures
//! (validation, configuration, provider errors outside the retryable
//! status set) propagate after the first attempt; on exhaustion the last
//! failure propagates unchanged.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::{RetryDisposition, TxLensError};

/// Default maximum number of retry attempts.
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default initial delay for exponential backoff (500ms).
const DEFAULT_INITIAL_DELAY_MS: u64 = 500;
/// Default maximum delay between retries (30 seconds).
const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
/// Default backoff multiplier.
const DEFAULT_MULTIPLIER: f64 = 2.0;
/// Status codes retried by default: request timeout, rate limiting, and
/// transient server failures.
const DEFAULT_RETRYABLE_STATUS: &[i64] = &[408, 429, 500, 502, 503, 504];

/// Retry policy configuration and executor.
///
/// # Example
///
/// ```rust
/// use txlens::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_retries(5)
///     .with_initial_delay(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum retry attempts (not counting the initial request).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the computed backoff delay.
    pub max_delay: Duration,
    /// Backoff multiplier applied per attempt.
    pub multiplier: f64,
    /// Provider status codes that are retried.
    pub retryable_status: Vec<i64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            multiplier: DEFAULT_MULTIPLIER,
            retryable_status: DEFAULT_RETRYABLE_STATUS.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never retries.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Aggressive preset: 5 retries from a 100ms initial delay, capped at
    /// 10 seconds.
    pub fn aggressive() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            ..Self::default()
        }
    }

    /// Conservative preset: 3 retries from a 1s initial delay, capped at
    /// 60 seconds.
    pub fn conservative() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            ..Self::default()
        }
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the initial backoff delay.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the backoff delay cap.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Replaces the retryable provider status codes.
    #[must_use]
    pub fn with_retryable_status(mut self, status: Vec<i64>) -> Self {
        self.retryable_status = status;
        self
    }

    /// Executes `op` with retries.
    ///
    /// `op` receives the zero-based attempt number and is re-invoked for
    /// each attempt, so per-attempt state (rate-limiter admission, request
    /// construction) is re-established every time.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, TxLensError>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<T, TxLensError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempt, "request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    let delay = match error.retry_disposition(&self.retryable_status) {
                        RetryDisposition::Fatal => {
                            debug!(error = %error, "non-retryable error, not retrying");
                            return Err(error);
                        }
                        RetryDisposition::Retryable => self.backoff_delay(attempt),
                        RetryDisposition::RetryableAfter(server_delay) => server_delay,
                    };

                    if attempt >= self.max_retries {
                        warn!(
                            error = %error,
                            attempts = attempt + 1,
                            "max retries exceeded"
                        );
                        return Err(error);
                    }

                    warn!(
                        error = %error,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis(),
                        "retryable error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Backoff for a given attempt: `initial * multiplier^attempt`, capped.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.min(63) as i32);
        let delay_ms = (self.initial_delay.as_millis() as f64 * factor)
            .min(self.max_delay.as_millis() as f64);
        Duration::from_millis(delay_ms as u64)
    }
}
