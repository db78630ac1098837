// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Bounded in-memory cache with per-entry TTL.
//!
//! [`BoundedTtlCache`] is the generic store; [`QueryCache`] specializes it
//! for paginated query results keyed by a canonical serialization of
//! (network, address, options).

mod query;

pub use query::{QueryCache, QueryCacheConfig};

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use crate::types::TimestampMillis;

/// Default time-to-live for cache entries (60 seconds).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
/// Default maximum number of entries.
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// A cached value with its creation and expiry times.
///
/// Entries are immutable once created; re-caching a key replaces the entry
/// wholesale rather than mutating it.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: TimestampMillis,
    expires_at: TimestampMillis,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        let created_at = TimestampMillis::now();
        Self {
            value,
            created_at,
            expires_at: created_at.saturating_add(ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_elapsed()
    }
}

/// Cache statistics counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that returned an unexpired value.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
    /// Entries removed to make room at capacity.
    pub evictions: u64,
    /// Entries removed because their TTL elapsed.
    pub expirations: u64,
    /// Live entries at the last mutation.
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage of all lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64 * 100.0
    }
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
}

/// String-keyed cache with per-entry expiry and size-bounded eviction.
///
/// - `get` returns a value only while unexpired, purging the expired entry
///   it finds in its place.
/// - `insert` purges all expired entries first; if the store is still at
///   capacity, the single oldest entry by creation time is evicted.
///
/// All mutation happens behind one async mutex, so the cache is safe to
/// share across tasks.
#[derive(Debug)]
pub struct BoundedTtlCache<V> {
    default_ttl: Duration,
    max_entries: usize,
    state: Mutex<CacheState<V>>,
}

impl<V: Clone> BoundedTtlCache<V> {
    /// Creates a cache with the given default TTL and capacity.
    pub fn new(default_ttl: Duration, max_entries: usize) -> Self {
        Self {
            default_ttl,
            max_entries: max_entries.max(1),
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    /// Returns the stored value if present and unexpired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut state = self.state.lock().await;

        if let Some(entry) = state.entries.get(key) {
            if entry.is_expired() {
                debug!(key, "cache entry expired");
                state.entries.remove(key);
                state.stats.expirations += 1;
                state.stats.misses += 1;
                state.stats.entries = state.entries.len();
                return None;
            }
            state.stats.hits += 1;
            debug!(key, "cache hit");
            return Some(state.entries[key].value.clone());
        }

        state.stats.misses += 1;
        debug!(key, "cache miss");
        None
    }

    /// Stores a value under `key`, expiring after `ttl` (or the default).
    ///
    /// Expired entries are purged before the insert; if the store is still
    /// at capacity, the oldest entry by creation time is evicted.
    pub async fn insert(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut state = self.state.lock().await;

        Self::purge_expired(&mut state);

        // Replacing an existing key does not need room.
        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_entries {
            Self::evict_oldest(&mut state);
        }

        debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "cache insert");
        state.entries.insert(key, CacheEntry::new(value, ttl));
        state.stats.entries = state.entries.len();
    }

    /// Whether an unexpired entry exists for `key`.
    pub async fn contains(&self, key: &str) -> bool {
        let mut state = self.state.lock().await;
        match state.entries.get(key) {
            Some(entry) if !entry.is_expired() => true,
            Some(_) => {
                state.entries.remove(key);
                state.stats.expirations += 1;
                state.stats.entries = state.entries.len();
                false
            }
            None => false,
        }
    }

    /// Removes the entry for `key`, reporting whether one was present.
    pub async fn remove(&self, key: &str) -> bool {
        let mut state = self.state.lock().await;
        let removed = state.entries.remove(key).is_some();
        state.stats.entries = state.entries.len();
        removed
    }

    /// Removes every entry whose key satisfies `predicate`, returning the
    /// number removed.
    pub async fn remove_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let mut state = self.state.lock().await;
        let before = state.entries.len();
        state.entries.retain(|key, _| !predicate(key));
        let removed = before - state.entries.len();
        state.stats.entries = state.entries.len();
        if removed > 0 {
            debug!(removed, "cache selective removal");
        }
        removed
    }

    /// Removes all entries.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        debug!(entries = state.entries.len(), "clearing cache");
        state.entries.clear();
        state.stats.entries = 0;
    }

    /// Number of unexpired entries. Purges expired entries first.
    pub async fn len(&self) -> usize {
        let mut state = self.state.lock().await;
        Self::purge_expired(&mut state);
        state.entries.len()
    }

    /// Whether the cache holds no unexpired entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Current statistics.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        state.stats.clone()
    }

    fn purge_expired(state: &mut CacheState<V>) {
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired());
        let purged = before - state.entries.len();
        if purged > 0 {
            state.stats.expirations += purged as u64;
            state.stats.entries = state.entries.len();
        }
    }

    /// Evicts the single oldest entry by creation time.
    fn evict_oldest(state: &mut CacheState<V>) {
        let oldest_key = state
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest_key {
            debug!(key = %key, "evicting oldest cache entry");
            state.entries.remove(&key);
            state.stats.evictions += 1;
            state.stats.entries = state.entries.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(ttl_ms: u64, max: usize) -> BoundedTtlCache<String> {
        BoundedTtlCache::new(Duration::from_millis(ttl_ms), max)
    }

    #[tokio::test]
    async fn get_after_insert_returns_value() {
        let cache = cache(10_000, 10);
        cache.insert("k", "v".to_string(), None).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let cache = cache(10_000, 10);
        assert!(cache.get("nope").await.is_none());
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = cache(30, 10);
        cache.insert("k", "v".to_string(), None).await;
        assert!(cache.get("k").await.is_some());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get("k").await.is_none());

        let stats = cache.stats().await;
        assert_eq!(stats.expirations, 1);
    }

    #[tokio::test]
    async fn per_entry_ttl_overrides_default() {
        let cache = cache(10_000, 10);
        cache
            .insert("k", "v".to_string(), Some(Duration::from_millis(30)))
            .await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn capacity_evicts_exactly_the_oldest() {
        let cache = cache(10_000, 3);
        cache.insert("a", "1".to_string(), None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert("b", "2".to_string(), None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert("c", "3".to_string(), None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        cache.insert("d", "4".to_string(), None).await;

        assert!(cache.get("a").await.is_none(), "oldest entry evicted");
        assert!(cache.get("b").await.is_some());
        assert!(cache.get("c").await.is_some());
        assert!(cache.get("d").await.is_some());
        assert_eq!(cache.stats().await.evictions, 1);
    }

    #[tokio::test]
    async fn replacing_a_key_does_not_evict() {
        let cache = cache(10_000, 2);
        cache.insert("a", "1".to_string(), None).await;
        cache.insert("b", "2".to_string(), None).await;
        cache.insert("a", "updated".to_string(), None).await;

        assert_eq!(cache.get("a").await.as_deref(), Some("updated"));
        assert_eq!(cache.get("b").await.as_deref(), Some("2"));
        assert_eq!(cache.stats().await.evictions, 0);
    }

    #[tokio::test]
    async fn len_excludes_expired_entries() {
        let cache = cache(30, 10);
        cache.insert("a", "1".to_string(), None).await;
        cache
            .insert("b", "2".to_string(), Some(Duration::from_secs(10)))
            .await;
        assert_eq!(cache.len().await, 2);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let cache = cache(10_000, 10);
        cache.insert("a", "1".to_string(), None).await;
        cache.insert("b", "2".to_string(), None).await;

        assert!(cache.remove("a").await);
        assert!(!cache.remove("a").await);
        assert!(cache.get("a").await.is_none());

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn remove_where_filters_by_key() {
        let cache = cache(10_000, 10);
        cache.insert("eth:0xaa:1", "1".to_string(), None).await;
        cache.insert("eth:0xaa:2", "2".to_string(), None).await;
        cache.insert("eth:0xbb:1", "3".to_string(), None).await;

        let removed = cache.remove_where(|k| k.starts_with("eth:0xaa:")).await;
        assert_eq!(removed, 2);
        assert!(cache.get("eth:0xbb:1").await.is_some());
    }

    #[tokio::test]
    async fn hit_rate() {
        let cache = cache(10_000, 10);
        cache.insert("k", "v".to_string(), None).await;
        cache.get("k").await;
        cache.get("k").await;
        cache.get("k").await;
        cache.get("missing").await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 75.0);
    }
}
