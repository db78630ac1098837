// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Solana JSON-RPC provider.
//!
//! Cursor-paged in two phases: one `getSignaturesForAddress` call fetches a
//! page of lightweight signature records ("strictly before this cursor"),
//! then `getTransaction` resolves full detail for every signature. Detail
//! calls are issued concurrently with `join_all`, each one individually
//! rate-limited and retried, and collected in signature order, since
//! `join_all` yields results by input index, not completion time. A
//! signature whose detail resolves to `null` (pruned history) is dropped
//! from the page rather than failing the batch.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::errors::TxLensError;
use crate::limiter::{DualWindowRateLimiter, RateLimiterConfig};
use crate::retry::RetryPolicy;
use crate::transport::HttpTransport;
use crate::types::{
    InstructionSummary, PaginationMetadata, PaginationOptions, SolanaTransaction,
    TimestampMillis, TokenBalanceDelta, Transaction, TransactionPage, TransactionStatus,
};

/// Provider name carried in error context.
const PROVIDER_NAME: &str = "solana-rpc";

/// Configuration for [`SolanaProvider`].
#[derive(Debug, Clone)]
pub struct SolanaConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Commitment level for both RPC methods.
    pub commitment: String,
    /// Rate limiter windows for this backend.
    pub rate_limit: RateLimiterConfig,
    /// Retry policy for this backend.
    pub retry: RetryPolicy,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SolanaConfig {
    /// Creates a config against the given RPC endpoint.
    #[must_use]
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            commitment: "confirmed".to_string(),
            rate_limit: RateLimiterConfig::default(),
            retry: RetryPolicy::default(),
            timeout: crate::transport::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Conservative preset for public RPC endpoints (5 req/s, 100 req/min).
    #[must_use]
    pub fn public_endpoint(rpc_url: impl Into<String>) -> Self {
        Self {
            rate_limit: RateLimiterConfig::per_second_and_minute(5, 100),
            retry: RetryPolicy::conservative(),
            ..Self::new(rpc_url)
        }
    }

    /// Overrides the commitment level.
    #[must_use]
    pub fn with_commitment(mut self, commitment: impl Into<String>) -> Self {
        self.commitment = commitment.into();
        self
    }
}

/// JSON-RPC provider for Solana transaction history.
#[derive(Debug)]
pub struct SolanaProvider {
    rpc_url: Url,
    commitment: String,
    limiter: DualWindowRateLimiter,
    retry: RetryPolicy,
    transport: Arc<dyn HttpTransport>,
}

impl SolanaProvider {
    /// Creates a provider, validating the configuration.
    pub fn new(
        config: SolanaConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, TxLensError> {
        let rpc_url = Url::parse(&config.rpc_url).map_err(|e| {
            TxLensError::configuration(
                crate::types::Network::Solana,
                format!("invalid solana rpc url `{}`: {e}", config.rpc_url),
            )
        })?;
        Ok(Self {
            rpc_url,
            commitment: config.commitment,
            limiter: DualWindowRateLimiter::new(config.rate_limit),
            retry: config.retry,
            transport,
        })
    }

    /// Fetches one page of transactions for a (validated) address.
    pub async fn get_transactions(
        &self,
        address: &str,
        options: &PaginationOptions,
    ) -> Result<TransactionPage, TxLensError> {
        let limit = options.limit;
        let signatures = self.fetch_signatures(address, limit, options.cursor.as_deref()).await?;

        debug!(
            address,
            signatures = signatures.len(),
            "resolving solana transaction details"
        );

        // One detail call per signature, concurrently; join_all returns
        // results in input order regardless of completion order.
        let details = join_all(
            signatures
                .iter()
                .map(|record| self.fetch_detail(&record.signature)),
        )
        .await;

        let has_more = signatures.len() as u32 == limit && limit > 0;
        let next_cursor = if has_more {
            signatures.last().map(|record| record.signature.clone())
        } else {
            None
        };

        let mut data = Vec::with_capacity(signatures.len());
        for (record, detail) in signatures.into_iter().zip(details) {
            match detail? {
                Some(detail) => data.push(map_transaction(record, detail)?),
                // Detail pruned by the node; drop the record.
                None => debug!(signature = %record.signature, "detail unavailable, dropping"),
            }
        }

        Ok(TransactionPage {
            data,
            pagination: PaginationMetadata {
                has_more,
                next_cursor,
                ..Default::default()
            },
        })
    }

    async fn fetch_signatures(
        &self,
        address: &str,
        limit: u32,
        before: Option<&str>,
    ) -> Result<Vec<RawSignatureRecord>, TxLensError> {
        let mut params_obj = json!({
            "limit": limit,
            "commitment": self.commitment,
        });
        if let Some(cursor) = before {
            params_obj["before"] = json!(cursor);
        }

        let result = self
            .rpc_call(
                "getSignaturesForAddress",
                json!([address, params_obj]),
                "solana getSignaturesForAddress",
            )
            .await?;

        serde_json::from_value(result).map_err(|e| {
            TxLensError::provider(
                PROVIDER_NAME,
                None,
                format!("malformed signature list: {e}"),
            )
        })
    }

    async fn fetch_detail(
        &self,
        signature: &str,
    ) -> Result<Option<RawTransactionDetail>, TxLensError> {
        let params = json!([
            signature,
            {
                "encoding": "jsonParsed",
                "commitment": self.commitment,
                "maxSupportedTransactionVersion": 0,
            }
        ]);

        let result = self
            .rpc_call("getTransaction", params, "solana getTransaction")
            .await?;

        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| {
                TxLensError::provider(
                    PROVIDER_NAME,
                    None,
                    format!("malformed transaction detail: {e}"),
                )
            })
    }

    /// One rate-limited, retried JSON-RPC call, unwrapped to its `result`.
    async fn rpc_call(
        &self,
        method: &str,
        params: Value,
        operation: &str,
    ) -> Result<Value, TxLensError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let envelope = self
            .retry
            .execute(|_| {
                let body = body.clone();
                async move {
                    self.limiter.acquire().await?;
                    self.transport.post_json(&self.rpc_url, body, operation).await
                }
            })
            .await?;

        if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
            let code = error.get("code").and_then(Value::as_i64);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown rpc error")
                .to_string();
            return Err(TxLensError::provider(PROVIDER_NAME, code, message));
        }

        Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
    }
}

/// Lightweight signature record from `getSignaturesForAddress`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSignatureRecord {
    signature: String,
    slot: u64,
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    memo: Option<String>,
    #[serde(default)]
    block_time: Option<i64>,
}

/// Full transaction detail from `getTransaction` (jsonParsed encoding).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransactionDetail {
    slot: u64,
    #[serde(default)]
    block_time: Option<i64>,
    transaction: RawTransactionBody,
    #[serde(default)]
    meta: Option<RawMeta>,
}

#[derive(Debug, Deserialize)]
struct RawTransactionBody {
    message: RawMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    #[serde(default)]
    account_keys: Vec<RawAccountKey>,
    #[serde(default)]
    instructions: Vec<RawInstruction>,
}

/// Account keys arrive as objects under jsonParsed encoding and as plain
/// strings under the legacy encodings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAccountKey {
    Parsed { pubkey: String },
    Plain(String),
}

impl RawAccountKey {
    fn pubkey(&self) -> &str {
        match self {
            RawAccountKey::Parsed { pubkey } => pubkey,
            RawAccountKey::Plain(pubkey) => pubkey,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInstruction {
    #[serde(default)]
    program_id: Option<String>,
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    parsed: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeta {
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    fee: Option<u64>,
    #[serde(default)]
    compute_units_consumed: Option<u64>,
    #[serde(default)]
    pre_token_balances: Option<Vec<RawTokenBalance>>,
    #[serde(default)]
    post_token_balances: Option<Vec<RawTokenBalance>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenBalance {
    account_index: u64,
    mint: String,
    #[serde(default)]
    owner: Option<String>,
    ui_token_amount: RawUiTokenAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUiTokenAmount {
    amount: String,
    decimals: u8,
}

fn map_transaction(
    record: RawSignatureRecord,
    detail: RawTransactionDetail,
) -> Result<Transaction, TxLensError> {
    let block_time = detail.block_time.or(record.block_time);
    let timestamp = block_time
        .and_then(|t| u64::try_from(t).ok())
        .map(TimestampMillis::from_secs);

    let status = match &detail.meta {
        Some(meta) if meta.err.is_some() => TransactionStatus::Failed,
        Some(_) => TransactionStatus::Success,
        // No meta and no block time: the node has not finalized the record.
        None if record.err.is_some() => TransactionStatus::Failed,
        None => TransactionStatus::Pending,
    };

    let account_keys: Vec<String> = detail
        .transaction
        .message
        .account_keys
        .iter()
        .map(|key| key.pubkey().to_string())
        .collect();

    let instructions = detail
        .transaction
        .message
        .instructions
        .iter()
        .map(|ix| InstructionSummary {
            program_id: ix.program_id.clone().unwrap_or_default(),
            program: ix.program.clone(),
            instruction_type: ix
                .parsed
                .as_ref()
                .and_then(|p| p.get("type"))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .collect();

    let token_balance_deltas = match &detail.meta {
        Some(meta) => map_token_deltas(
            meta.pre_token_balances.as_deref().unwrap_or_default(),
            meta.post_token_balances.as_deref().unwrap_or_default(),
        )?,
        None => Vec::new(),
    };

    Ok(Transaction::Solana(SolanaTransaction {
        signature: record.signature,
        slot: detail.slot,
        timestamp,
        status,
        fee: detail.meta.as_ref().and_then(|m| m.fee),
        compute_units: detail.meta.as_ref().and_then(|m| m.compute_units_consumed),
        fee_payer: account_keys.first().cloned(),
        account_keys,
        instructions,
        token_balance_deltas,
        memo: record.memo,
    }))
}

/// Joins pre and post token balances on (account index, mint).
fn map_token_deltas(
    pre: &[RawTokenBalance],
    post: &[RawTokenBalance],
) -> Result<Vec<TokenBalanceDelta>, TxLensError> {
    let mut deltas: Vec<TokenBalanceDelta> = Vec::new();

    fn entry_for(deltas: &mut Vec<TokenBalanceDelta>, balance: &RawTokenBalance) -> usize {
        if let Some(pos) = deltas
            .iter()
            .position(|d| d.account_index == balance.account_index && d.mint == balance.mint)
        {
            return pos;
        }
        deltas.push(TokenBalanceDelta {
            account_index: balance.account_index,
            mint: balance.mint.clone(),
            owner: balance.owner.clone(),
            pre_amount: 0,
            post_amount: 0,
            decimals: balance.ui_token_amount.decimals,
        });
        deltas.len() - 1
    }

    for balance in pre {
        let amount = parse_amount(&balance.ui_token_amount.amount)?;
        let idx = entry_for(&mut deltas, balance);
        deltas[idx].pre_amount = amount;
    }
    for balance in post {
        let amount = parse_amount(&balance.ui_token_amount.amount)?;
        let idx = entry_for(&mut deltas, balance);
        deltas[idx].post_amount = amount;
    }

    deltas.sort_by_key(|d| d.account_index);
    Ok(deltas)
}

fn parse_amount(value: &str) -> Result<u128, TxLensError> {
    value.parse::<u128>().map_err(|_| {
        TxLensError::provider(
            PROVIDER_NAME,
            None,
            format!("malformed token amount `{value}`"),
        )
    })
}
