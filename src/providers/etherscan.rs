// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Etherscan-compatible REST indexer provider.
//!
//! Offset-paged: each call fetches one numeric page of `limit` records.
//! The indexer does not expose a reliable total count, so `has_more` is
//! inferred by the full-page heuristic (`records == limit`).

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::errors::TxLensError;
use crate::limiter::{DualWindowRateLimiter, RateLimiterConfig};
use crate::retry::RetryPolicy;
use crate::transport::HttpTransport;
use crate::types::{
    EvmTransaction, Network, PaginationMetadata, PaginationOptions, TimestampMillis, Transaction,
    TransactionPage, TransactionStatus,
};

/// Provider name carried in error context.
const PROVIDER_NAME: &str = "etherscan";

/// Configuration for [`EtherscanProvider`].
#[derive(Debug, Clone)]
pub struct EtherscanConfig {
    /// Indexer API base URL.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Chain id selector (1 for mainnet).
    pub chain_id: u64,
    /// Rate limiter windows for this backend.
    pub rate_limit: RateLimiterConfig,
    /// Retry policy for this backend.
    pub retry: RetryPolicy,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl EtherscanConfig {
    /// Creates a config for the given API key against the public mainnet
    /// endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.etherscan.io/v2/api".to_string(),
            api_key: api_key.into(),
            chain_id: 1,
            rate_limit: RateLimiterConfig::default(),
            retry: RetryPolicy::default(),
            timeout: crate::transport::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Conservative preset for the free public tier (5 req/s, 100 req/min).
    #[must_use]
    pub fn public_endpoint(api_key: impl Into<String>) -> Self {
        Self {
            rate_limit: RateLimiterConfig::per_second_and_minute(5, 100),
            retry: RetryPolicy::conservative(),
            ..Self::new(api_key)
        }
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the chain id.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }
}

/// REST indexer provider for Ethereum transaction history.
#[derive(Debug)]
pub struct EtherscanProvider {
    base_url: Url,
    api_key: String,
    chain_id: u64,
    limiter: DualWindowRateLimiter,
    retry: RetryPolicy,
    transport: Arc<dyn HttpTransport>,
}

impl EtherscanProvider {
    /// Creates a provider, validating the configuration.
    pub fn new(
        config: EtherscanConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, TxLensError> {
        if config.api_key.trim().is_empty() {
            return Err(TxLensError::configuration(
                Network::Ethereum,
                "etherscan api key is empty",
            ));
        }
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            TxLensError::configuration(
                Network::Ethereum,
                format!("invalid etherscan base url `{}`: {e}", config.base_url),
            )
        })?;
        Ok(Self {
            base_url,
            api_key: config.api_key,
            chain_id: config.chain_id,
            limiter: DualWindowRateLimiter::new(config.rate_limit),
            retry: config.retry,
            transport,
        })
    }

    /// Fetches one page of transactions for a (validated, normalized)
    /// address.
    pub async fn get_transactions(
        &self,
        address: &str,
        options: &PaginationOptions,
    ) -> Result<TransactionPage, TxLensError> {
        let page = options.page.unwrap_or(1);
        let limit = options.limit;
        let url = self.txlist_url(address, page, limit);

        debug!(address, page, limit, "fetching etherscan transaction page");

        let envelope = self
            .retry
            .execute(|_| {
                let url = url.clone();
                async move {
                    self.limiter.acquire().await?;
                    self.transport.get_json(&url, "etherscan txlist").await
                }
            })
            .await?;

        let records = parse_envelope(envelope)?;
        let has_more = records.len() as u32 == limit && limit > 0;

        let data = records
            .into_iter()
            .map(map_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransactionPage {
            data,
            pagination: PaginationMetadata {
                has_more,
                page: Some(page),
                ..Default::default()
            },
        })
    }

    fn txlist_url(&self, address: &str, page: u32, limit: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("chainid", &self.chain_id.to_string())
            .append_pair("module", "account")
            .append_pair("action", "txlist")
            .append_pair("address", address)
            .append_pair("startblock", "0")
            .append_pair("endblock", "99999999")
            .append_pair("page", &page.to_string())
            .append_pair("offset", &limit.to_string())
            .append_pair("sort", "desc")
            .append_pair("apikey", &self.api_key);
        url
    }
}

/// The indexer's response envelope. `result` is an array on success and a
/// plain string on failure (including the benign "No transactions found").
#[derive(Debug, Deserialize)]
struct IndexerEnvelope {
    status: String,
    message: String,
    result: Value,
}

/// Raw transaction record as returned by the indexer. Every numeric field
/// arrives as a decimal string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvmRecord {
    hash: String,
    block_number: String,
    time_stamp: String,
    from: String,
    #[serde(default)]
    to: String,
    value: String,
    gas: String,
    gas_price: String,
    #[serde(default)]
    gas_used: Option<String>,
    nonce: String,
    #[serde(default)]
    is_error: Option<String>,
    #[serde(rename = "txreceipt_status", default)]
    txreceipt_status: Option<String>,
}

fn parse_envelope(envelope: Value) -> Result<Vec<RawEvmRecord>, TxLensError> {
    let envelope: IndexerEnvelope = serde_json::from_value(envelope)
        .map_err(|e| TxLensError::provider(PROVIDER_NAME, None, format!("malformed envelope: {e}")))?;

    match envelope.status.as_str() {
        "1" => serde_json::from_value(envelope.result).map_err(|e| {
            TxLensError::provider(PROVIDER_NAME, None, format!("malformed result: {e}"))
        }),
        "0" => {
            let result_text = envelope.result.as_str().unwrap_or_default();
            if result_text.contains("No transactions found")
                || envelope.message.contains("No transactions found")
            {
                Ok(Vec::new())
            } else {
                let message = if result_text.is_empty() {
                    envelope.message
                } else {
                    result_text.to_string()
                };
                Err(TxLensError::provider(PROVIDER_NAME, None, message))
            }
        }
        other => Err(TxLensError::provider(
            PROVIDER_NAME,
            None,
            format!("unexpected envelope status `{other}`"),
        )),
    }
}

fn map_record(raw: RawEvmRecord) -> Result<Transaction, TxLensError> {
    let block_number = parse_u64("blockNumber", &raw.block_number)?;
    let timestamp = TimestampMillis::from_secs(parse_u64("timeStamp", &raw.time_stamp)?);
    let value = parse_u128("value", &raw.value)?;
    let gas_limit = parse_u64("gas", &raw.gas)?;
    let gas_price = parse_u128("gasPrice", &raw.gas_price)?;
    let nonce = parse_u64("nonce", &raw.nonce)?;
    let gas_used = raw
        .gas_used
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| parse_u64("gasUsed", s))
        .transpose()?;

    // The receipt status field is empty for pre-Byzantium records; fall
    // back to isError alone there.
    let failed = raw.is_error.as_deref() == Some("1")
        || raw.txreceipt_status.as_deref() == Some("0");
    let status = if failed {
        TransactionStatus::Failed
    } else {
        TransactionStatus::Success
    };

    let fee = gas_used.map(|used| u128::from(used) * gas_price);
    let to = if raw.to.is_empty() { None } else { Some(raw.to) };

    Ok(Transaction::Ethereum(EvmTransaction {
        hash: raw.hash,
        block_number,
        timestamp,
        status,
        from: raw.from,
        to,
        value,
        gas_limit,
        gas_price,
        gas_used,
        fee,
        nonce,
    }))
}

fn parse_u64(field: &str, value: &str) -> Result<u64, TxLensError> {
    value.parse::<u64>().map_err(|_| {
        TxLensError::provider(
            PROVIDER_NAME,
            None,
            format!("malformed numeric field `{field}`: `{value}`"),
        )
    })
}

fn parse_u128(field: &str, value: &str) -> Result<u128, TxLensError> {
    value.parse::<u128>().map_err(|_| {
        TxLensError::provider(
            PROVIDER_NAME,
            None,
            format!("malformed numeric field `{field}`: `{value}`"),
        )
    })
}
