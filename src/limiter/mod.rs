// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Dual-window token-bucket rate limiter with FIFO admission.
//!
//! Each provider owns one limiter enforcing two rolling windows at once:
//! a short burst window (e.g. per second) and a long sustained window
//! (e.g. per minute). A request is admitted only when both buckets hold at
//! least one token; admission consumes one token from each.
//!
//! Callers that cannot be admitted immediately wait in an explicit FIFO
//! queue of completion signals, so admission order is exactly arrival order
//! and is observable in tests. A single drain task services the queue; its
//! iteration count is capped so a misconfigured limiter (e.g. a
//! zero-capacity bucket) fails every waiter with
//! [`TxLensError::LimiterFault`] instead of hanging forever.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error};

use crate::errors::TxLensError;

/// Upper bound on drain-loop passes per activation. Far above anything a
/// correctly configured limiter reaches; tripping it means the limiter
/// cannot make progress.
const MAX_DRAIN_ITERATIONS: u32 = 1_000;

/// Configuration for [`DualWindowRateLimiter`].
///
/// # Example
///
/// ```rust
/// use txlens::RateLimiterConfig;
/// use std::time::Duration;
///
/// // 5 requests per second, 100 per minute
/// let config = RateLimiterConfig::new(5, Duration::from_secs(1), 100, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Requests admitted per short window.
    pub short_capacity: u32,
    /// Length of the short window.
    pub short_window: Duration,
    /// Requests admitted per long window.
    pub long_capacity: u32,
    /// Length of the long window.
    pub long_window: Duration,
    /// When false, every acquisition succeeds instantly.
    pub enabled: bool,
}

impl RateLimiterConfig {
    /// Creates a config with both windows enabled.
    #[must_use]
    pub fn new(
        short_capacity: u32,
        short_window: Duration,
        long_capacity: u32,
        long_window: Duration,
    ) -> Self {
        Self {
            short_capacity,
            short_window,
            long_capacity,
            long_window,
            enabled: true,
        }
    }

    /// Convenience constructor: `per_second` requests/second and
    /// `per_minute` requests/minute.
    #[must_use]
    pub fn per_second_and_minute(per_second: u32, per_minute: u32) -> Self {
        Self::new(
            per_second,
            Duration::from_secs(1),
            per_minute,
            Duration::from_secs(60),
        )
    }

    /// A limiter that admits everything instantly.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::per_second_and_minute(5, 100)
    }
}

/// One token bucket with continuous refill.
#[derive(Debug)]
struct TokenBucket {
    /// Maximum number of tokens the bucket holds.
    capacity: u32,
    /// Currently available tokens (fractional during refill).
    tokens: f64,
    /// Refill rate in tokens per nanosecond.
    refill_rate: f64,
    /// Last time tokens were refilled.
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: u32, window: Duration) -> Self {
        let nanos = window.as_nanos().max(1) as f64;
        Self {
            capacity,
            tokens: capacity as f64,
            refill_rate: capacity as f64 / nanos,
            last_refill: Instant::now(),
        }
    }

    /// Refill tokens based on elapsed time, capped at capacity.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let new_tokens = elapsed.as_nanos() as f64 * self.refill_rate;
        self.tokens = (self.tokens + new_tokens).min(self.capacity as f64);
        self.last_refill = now;
    }

    fn has_token(&mut self) -> bool {
        self.refill();
        self.tokens >= 1.0
    }

    fn consume(&mut self) {
        self.tokens -= 1.0;
        // Tokens never go negative: consume() is only reached after both
        // buckets passed has_token().
        debug_assert!(self.tokens >= 0.0);
    }

    /// Time until one full token is available. `None` when the bucket can
    /// never produce a token (zero refill rate).
    fn time_to_one_token(&mut self) -> Option<Duration> {
        self.refill();
        if self.tokens >= 1.0 {
            return Some(Duration::ZERO);
        }
        if self.refill_rate <= 0.0 {
            return None;
        }
        let needed = 1.0 - self.tokens;
        Some(Duration::from_nanos((needed / self.refill_rate) as u64))
    }
}

type AdmissionSender = oneshot::Sender<Result<(), TxLensError>>;

#[derive(Debug)]
struct LimiterState {
    short: TokenBucket,
    long: TokenBucket,
    /// Waiters in arrival order. Front is served first, always.
    queue: VecDeque<AdmissionSender>,
    /// Whether a drain task is currently servicing the queue.
    draining: bool,
}

impl LimiterState {
    /// Admits one request if both buckets hold a token.
    fn try_admit(&mut self) -> bool {
        if self.short.has_token() && self.long.has_token() {
            self.short.consume();
            self.long.consume();
            true
        } else {
            false
        }
    }

    /// Time until the next admission becomes possible; `None` when it
    /// never will (zero-capacity bucket).
    fn next_admission_wait(&mut self) -> Option<Duration> {
        let short = self.short.time_to_one_token()?;
        let long = self.long.time_to_one_token()?;
        Some(short.max(long))
    }

    /// Rejects every queued waiter with a limiter fault.
    fn fail_all(&mut self, iterations: u32) {
        error!(
            waiters = self.queue.len(),
            iterations, "rate limiter drain loop cannot make progress, rejecting all waiters"
        );
        while let Some(tx) = self.queue.pop_front() {
            let _ = tx.send(Err(TxLensError::LimiterFault { iterations }));
        }
    }
}

/// Token-bucket admission control over two concurrent rolling windows.
///
/// [`acquire`](Self::acquire) resolves when the caller may issue one
/// request; [`try_acquire`](Self::try_acquire) performs the same check
/// without waiting. Waiters sharing one limiter are admitted strictly in
/// arrival order.
///
/// The limiter is cheap to clone; clones share the same token state and
/// queue.
#[derive(Debug, Clone)]
pub struct DualWindowRateLimiter {
    enabled: bool,
    state: Arc<Mutex<LimiterState>>,
}

impl DualWindowRateLimiter {
    /// Creates a limiter from the given configuration.
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            enabled: config.enabled,
            state: Arc::new(Mutex::new(LimiterState {
                short: TokenBucket::new(config.short_capacity, config.short_window),
                long: TokenBucket::new(config.long_capacity, config.long_window),
                queue: VecDeque::new(),
                draining: false,
            })),
        }
    }

    /// A limiter that admits everything instantly.
    pub fn disabled() -> Self {
        Self::new(RateLimiterConfig::disabled())
    }

    /// Attempts immediate admission without waiting.
    ///
    /// Refuses while earlier callers are still queued, so a successful
    /// `try_acquire` never overtakes a waiting `acquire`.
    pub async fn try_acquire(&self) -> bool {
        if !self.enabled {
            return true;
        }
        let mut state = self.state.lock().await;
        state.queue.is_empty() && !state.draining && state.try_admit()
    }

    /// Resolves when the caller is admitted.
    ///
    /// Admission is strictly FIFO: a caller that arrives while others are
    /// waiting joins the back of the queue even if a token happens to be
    /// available at that instant.
    pub async fn acquire(&self) -> Result<(), TxLensError> {
        if !self.enabled {
            return Ok(());
        }

        let rx = {
            let mut state = self.state.lock().await;
            if state.queue.is_empty() && !state.draining && state.try_admit() {
                return Ok(());
            }

            let (tx, rx) = oneshot::channel();
            state.queue.push_back(tx);
            debug!(waiters = state.queue.len(), "rate limiter queueing request");
            if !state.draining {
                state.draining = true;
                tokio::spawn(Self::drain(Arc::clone(&self.state)));
            }
            rx
        };

        match rx.await {
            Ok(result) => result,
            // Drain task dropped the sender without signaling; treat as a
            // limiter fault rather than hanging the caller.
            Err(_) => Err(TxLensError::LimiterFault { iterations: 0 }),
        }
    }

    /// Currently available tokens in the (short, long) buckets.
    ///
    /// Intended for diagnostics and deterministic tests.
    pub async fn available_tokens(&self) -> (f64, f64) {
        let mut state = self.state.lock().await;
        state.short.refill();
        state.long.refill();
        (state.short.tokens, state.long.tokens)
    }

    /// Services the wait queue until it is empty or the iteration cap trips.
    async fn drain(state: Arc<Mutex<LimiterState>>) {
        let mut iterations: u32 = 0;
        loop {
            iterations += 1;

            let wait = {
                let mut s = state.lock().await;

                while !s.queue.is_empty() && s.try_admit() {
                    // Receiver may have given up; the consumed token is lost
                    // either way.
                    if let Some(tx) = s.queue.pop_front() {
                        let _ = tx.send(Ok(()));
                    }
                }

                if s.queue.is_empty() {
                    s.draining = false;
                    return;
                }

                if iterations >= MAX_DRAIN_ITERATIONS {
                    s.fail_all(iterations);
                    s.draining = false;
                    return;
                }

                match s.next_admission_wait() {
                    Some(wait) => wait,
                    None => {
                        // Zero-capacity bucket: no amount of waiting helps.
                        s.fail_all(iterations);
                        s.draining = false;
                        return;
                    }
                }
            };

            tokio::time::sleep(wait).await;
        }
    }
}

impl Default for DualWindowRateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}
