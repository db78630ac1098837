// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The unified query facade.
//!
//! [`TxLens`] detects which network an address belongs to, dispatches to
//! the matching adapter, and wraps results through the shared query cache.
//! Network-specific entry points skip detection; cache management and
//! configuration introspection round out the surface.

use std::sync::Arc;

use tracing::debug;

use crate::adapters::{ethereum, solana, EthereumAdapter, SolanaAdapter};
use crate::cache::{CacheStats, QueryCache};
use crate::config::TxLensConfig;
use crate::errors::TxLensError;
use crate::providers::{EtherscanProvider, SolanaProvider};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{Network, PaginationOptions, TransactionPage};

/// Unified transaction-history client over both backends.
///
/// # Example
///
/// ```rust,ignore
/// use txlens::{EtherscanConfig, PaginationOptions, TxLens, TxLensConfig};
///
/// let client = TxLens::new(
///     TxLensConfig::builder()
///         .ethereum(EtherscanConfig::public_endpoint("MY-API-KEY"))
///         .build(),
/// )?;
///
/// let page = client
///     .get_transactions(
///         "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae",
///         &PaginationOptions::default(),
///     )
///     .await?;
/// ```
#[derive(Debug)]
pub struct TxLens {
    ethereum: Option<EthereumAdapter>,
    solana: Option<SolanaAdapter>,
    cache: QueryCache,
    cache_enabled: bool,
}

impl TxLens {
    /// Creates a client with production HTTP transports, one per backend
    /// so each honors its configured timeout.
    pub fn new(config: TxLensConfig) -> Result<Self, TxLensError> {
        let ethereum = config
            .ethereum
            .clone()
            .map(|backend| {
                let transport = Arc::new(ReqwestTransport::new(backend.timeout)?);
                EtherscanProvider::new(backend, transport).map(EthereumAdapter::new)
            })
            .transpose()?;
        let solana = config
            .solana
            .clone()
            .map(|backend| {
                let transport = Arc::new(ReqwestTransport::new(backend.timeout)?);
                SolanaProvider::new(backend, transport).map(SolanaAdapter::new)
            })
            .transpose()?;

        Ok(Self {
            ethereum,
            solana,
            cache: QueryCache::new(&config.cache),
            cache_enabled: config.cache.enabled,
        })
    }

    /// Creates a client with a caller-supplied transport shared by both
    /// backends. Used by tests and by callers embedding a custom HTTP
    /// stack.
    pub fn with_transport(
        config: TxLensConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, TxLensError> {
        let ethereum = config
            .ethereum
            .clone()
            .map(|backend| {
                EtherscanProvider::new(backend, Arc::clone(&transport)).map(EthereumAdapter::new)
            })
            .transpose()?;
        let solana = config
            .solana
            .clone()
            .map(|backend| {
                SolanaProvider::new(backend, Arc::clone(&transport)).map(SolanaAdapter::new)
            })
            .transpose()?;

        Ok(Self {
            ethereum,
            solana,
            cache: QueryCache::new(&config.cache),
            cache_enabled: config.cache.enabled,
        })
    }

    /// Determines which network an address string belongs to.
    ///
    /// Raises a validation error when the input matches neither supported
    /// format; no network call is ever made for such input.
    pub fn detect_network(address: &str) -> Result<Network, TxLensError> {
        if ethereum::is_valid_address(address) {
            Ok(Network::Ethereum)
        } else if solana::is_valid_pubkey(address) {
            Ok(Network::Solana)
        } else {
            Err(TxLensError::validation(
                address,
                "matches neither a hex address nor a base58 public key",
            ))
        }
    }

    /// Fetches transaction history, auto-detecting the network.
    pub async fn get_transactions(
        &self,
        address: &str,
        options: &PaginationOptions,
    ) -> Result<TransactionPage, TxLensError> {
        let network = Self::detect_network(address)?;
        self.get_for_network(network, address, options).await
    }

    /// Fetches Ethereum transaction history, skipping auto-detection.
    pub async fn get_ethereum_transactions(
        &self,
        address: &str,
        options: &PaginationOptions,
    ) -> Result<TransactionPage, TxLensError> {
        self.get_for_network(Network::Ethereum, address, options).await
    }

    /// Fetches Solana transaction history, skipping auto-detection.
    pub async fn get_solana_transactions(
        &self,
        address: &str,
        options: &PaginationOptions,
    ) -> Result<TransactionPage, TxLensError> {
        self.get_for_network(Network::Solana, address, options).await
    }

    /// Whether the given network has a configured backend.
    pub fn is_network_configured(&self, network: Network) -> bool {
        match network {
            Network::Ethereum => self.ethereum.is_some(),
            Network::Solana => self.solana.is_some(),
        }
    }

    /// Removes cached pages for one address on one network, returning the
    /// number removed. The address is normalized the same way queries are,
    /// so casing differences cannot leave stale entries behind.
    pub async fn invalidate_cache(
        &self,
        network: Network,
        address: &str,
    ) -> Result<usize, TxLensError> {
        let normalized = Self::normalize_for(network, address)?;
        Ok(self.cache.invalidate(network, &normalized).await)
    }

    /// Removes every cached page.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Query cache statistics.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    async fn get_for_network(
        &self,
        network: Network,
        address: &str,
        options: &PaginationOptions,
    ) -> Result<TransactionPage, TxLensError> {
        // Normalize before touching the cache so logically identical
        // queries share a key regardless of input casing.
        let normalized = Self::normalize_for(network, address)?;

        if self.cache_enabled && !options.bypass_cache {
            if let Some(page) = self.cache.get(network, &normalized, options).await {
                debug!(%network, address = %normalized, "serving query from cache");
                return Ok(page);
            }
        }

        let page = match network {
            Network::Ethereum => {
                self.ethereum
                    .as_ref()
                    .ok_or_else(|| {
                        TxLensError::configuration(network, "ethereum backend not configured")
                    })?
                    .get_transactions(&normalized, options)
                    .await?
            }
            Network::Solana => {
                self.solana
                    .as_ref()
                    .ok_or_else(|| {
                        TxLensError::configuration(network, "solana backend not configured")
                    })?
                    .get_transactions(&normalized, options)
                    .await?
            }
        };

        if self.cache_enabled {
            self.cache
                .insert(network, &normalized, options, page.clone(), None)
                .await;
        }

        Ok(page)
    }

    fn normalize_for(network: Network, address: &str) -> Result<String, TxLensError> {
        match network {
            Network::Ethereum => ethereum::normalize_address(address),
            Network::Solana => solana::normalize_pubkey(address),
        }
    }
}
