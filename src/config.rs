// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Client configuration.
//!
//! A [`TxLensConfig`] names which backends are configured and how the
//! shared query cache behaves. Each backend section carries its own rate
//! limiter, retry policy, and timeout; nothing is shared across backends.
//!
//! # Example
//!
//! ```rust
//! use txlens::{EtherscanConfig, SolanaConfig, TxLensConfig};
//! use std::time::Duration;
//!
//! let config = TxLensConfig::builder()
//!     .ethereum(EtherscanConfig::public_endpoint("MY-API-KEY"))
//!     .solana(SolanaConfig::public_endpoint("https://api.mainnet-beta.solana.com"))
//!     .cache_ttl(Duration::from_secs(30))
//!     .build();
//! ```

use std::time::Duration;

use crate::cache::QueryCacheConfig;
use crate::providers::{EtherscanConfig, SolanaConfig};

/// Top-level configuration for [`TxLens`](crate::TxLens).
#[derive(Debug, Clone, Default)]
pub struct TxLensConfig {
    /// Ethereum backend, when configured.
    pub ethereum: Option<EtherscanConfig>,
    /// Solana backend, when configured.
    pub solana: Option<SolanaConfig>,
    /// Shared query cache settings.
    pub cache: QueryCacheConfig,
}

impl TxLensConfig {
    /// Creates a builder.
    pub fn builder() -> TxLensConfigBuilder {
        TxLensConfigBuilder::default()
    }
}

/// Fluent builder for [`TxLensConfig`].
#[derive(Debug, Clone, Default)]
pub struct TxLensConfigBuilder {
    config: TxLensConfig,
}

impl TxLensConfigBuilder {
    /// Configures the Ethereum backend.
    #[must_use]
    pub fn ethereum(mut self, config: EtherscanConfig) -> Self {
        self.config.ethereum = Some(config);
        self
    }

    /// Configures the Solana backend.
    #[must_use]
    pub fn solana(mut self, config: SolanaConfig) -> Self {
        self.config.solana = Some(config);
        self
    }

    /// Sets the default TTL for cached pages.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache.ttl = ttl;
        self
    }

    /// Sets the maximum number of cached pages.
    #[must_use]
    pub fn cache_max_entries(mut self, max_entries: usize) -> Self {
        self.config.cache.max_entries = max_entries;
        self
    }

    /// Disables response caching entirely.
    #[must_use]
    pub fn disable_cache(mut self) -> Self {
        self.config.cache.enabled = false;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> TxLensConfig {
        self.config
    }
}
