// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Query-result cache keyed by (network, address, options).

use std::time::Duration;

use tracing::debug;

use super::{BoundedTtlCache, CacheStats, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use crate::types::{Network, PaginationOptions, TransactionPage};

/// Cache configuration for [`QueryCache`].
#[derive(Debug, Clone)]
pub struct QueryCacheConfig {
    /// Whether the facade consults the cache at all.
    pub enabled: bool,
    /// Default TTL for cached pages.
    pub ttl: Duration,
    /// Maximum number of cached pages.
    pub max_entries: usize,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Cache of full paginated results, keyed canonically.
///
/// The key is a pure function of (network, normalized address, the subset
/// of options that identify a page): two logically identical queries
/// always produce the same key regardless of option presentation order,
/// and the `network:address:` prefix makes per-address invalidation a key
/// scan rather than a full clear.
#[derive(Debug)]
pub struct QueryCache {
    store: BoundedTtlCache<TransactionPage>,
}

impl QueryCache {
    /// Creates a cache from the given configuration.
    pub fn new(config: &QueryCacheConfig) -> Self {
        Self {
            store: BoundedTtlCache::new(config.ttl, config.max_entries),
        }
    }

    /// Canonical cache key for a query.
    ///
    /// Field order is fixed: network, address, limit, page, cursor, start,
    /// end. Absent fields serialize as `-`. The address must already be
    /// normalized by the adapter for its network (lowercase hex for
    /// Ethereum; Solana keys are case-significant and pass through
    /// unchanged).
    pub fn key(network: Network, address: &str, options: &PaginationOptions) -> String {
        format!(
            "{}:{}:limit={}:page={}:cursor={}:start={}:end={}",
            network,
            address,
            options.limit,
            options
                .page
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            options.cursor.as_deref().unwrap_or("-"),
            options
                .start_time
                .map_or_else(|| "-".to_string(), |t| t.as_millis().to_string()),
            options
                .end_time
                .map_or_else(|| "-".to_string(), |t| t.as_millis().to_string()),
        )
    }

    /// Looks up a cached page for the query.
    pub async fn get(
        &self,
        network: Network,
        address: &str,
        options: &PaginationOptions,
    ) -> Option<TransactionPage> {
        self.store.get(&Self::key(network, address, options)).await
    }

    /// Caches a page for the query.
    pub async fn insert(
        &self,
        network: Network,
        address: &str,
        options: &PaginationOptions,
        page: TransactionPage,
        ttl: Option<Duration>,
    ) {
        self.store
            .insert(Self::key(network, address, options), page, ttl)
            .await;
    }

    /// Removes every cached page for the given address on the given
    /// network, returning the number removed.
    ///
    /// Selective: entries for other addresses and networks are untouched.
    pub async fn invalidate(&self, network: Network, address: &str) -> usize {
        let prefix = format!("{network}:{address}:");
        let removed = self.store.remove_where(|key| key.starts_with(&prefix)).await;
        debug!(%network, address, removed, "invalidated cached queries");
        removed
    }

    /// Removes every cached page.
    pub async fn clear(&self) {
        self.store.clear().await;
    }

    /// Number of live cached pages.
    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    /// Whether the cache holds no live pages.
    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }

    /// Cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.stats().await
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(&QueryCacheConfig::default())
    }
}
