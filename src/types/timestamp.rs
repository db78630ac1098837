// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Millisecond timestamp strong type.
//!
//! Both backends report block time in whole seconds; the unified model and
//! the cache work in milliseconds so that ordering stays unique for entries
//! created in rapid succession.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Unix timestamp in milliseconds.
///
/// Used for transaction block times and for cache entry ordering, where
/// millisecond precision gives a reliable oldest-entry choice during
/// eviction.
///
/// # Examples
///
/// ```
/// use txlens::TimestampMillis;
/// use std::time::Duration;
///
/// let ts = TimestampMillis::now();
/// std::thread::sleep(Duration::from_millis(10));
/// assert!(ts.age_since_now() >= Duration::from_millis(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimestampMillis(u64);

impl TimestampMillis {
    /// Creates a timestamp representing the current time.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self(millis as u64)
    }

    /// Creates a timestamp from a raw millisecond value.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Creates a timestamp from a whole-second value, as reported by both
    /// backends (`timeStamp` / `blockTime`).
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000)
    }

    /// Raw millisecond value.
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp shifted forward by `duration`, saturating.
    pub fn saturating_add(&self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.as_millis() as u64))
    }

    /// Duration between this timestamp and now; zero if in the future.
    pub fn age_since_now(&self) -> Duration {
        let now = Self::now();
        Duration::from_millis(now.0.saturating_sub(self.0))
    }

    /// Whether this timestamp is older than `duration`.
    pub fn is_older_than(&self, duration: Duration) -> bool {
        self.age_since_now() > duration
    }

    /// Whether this timestamp lies in the past (or is exactly now).
    pub fn is_elapsed(&self) -> bool {
        *self <= Self::now()
    }
}

impl Default for TimestampMillis {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        let t1 = TimestampMillis::from_millis(1_000);
        let t2 = TimestampMillis::from_millis(2_000);
        assert!(t1 < t2);
    }

    #[test]
    fn from_secs_scales() {
        assert_eq!(TimestampMillis::from_secs(7).as_millis(), 7_000);
    }

    #[test]
    fn age_of_past_timestamp() {
        let past = TimestampMillis::from_millis(TimestampMillis::now().as_millis() - 5_000);
        let age = past.age_since_now();
        assert!(age >= Duration::from_millis(5_000));
        assert!(age < Duration::from_millis(6_000));
    }

    #[test]
    fn age_of_future_timestamp_is_zero() {
        let future = TimestampMillis::now().saturating_add(Duration::from_secs(5));
        assert_eq!(future.age_since_now(), Duration::ZERO);
        assert!(!future.is_elapsed());
    }

    #[test]
    fn is_older_than() {
        let past = TimestampMillis::from_millis(TimestampMillis::now().as_millis() - 5_000);
        assert!(past.is_older_than(Duration::from_millis(4_000)));
        assert!(!past.is_older_than(Duration::from_millis(6_000)));
    }

    #[test]
    fn serde_is_transparent() {
        let ts = TimestampMillis::from_millis(1234567890);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1234567890");
    }
}
