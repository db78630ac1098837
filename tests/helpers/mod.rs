// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for txlens integration tests.
//!
//! Provides a mock [`HttpTransport`] so the full client stack can be
//! exercised without real backends. The mock counts round trips, queues
//! canned REST envelopes for GET, and routes JSON-RPC POST bodies by
//! method.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use txlens::{HttpTransport, TxLensError};
use url::Url;

/// Mock transport with canned responses.
///
/// # Example
///
/// ```rust,ignore
/// let transport = MockTransport::new()
///     .with_get_response(etherscan_envelope(vec![raw_tx("0xaaa")]))
///     .with_signatures(json!([signature_record("sig1")]))
///     .with_detail("sig1", detail_json("sig1"));
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Queued GET responses, served front-first.
    gets: Mutex<VecDeque<Value>>,
    /// Queued `getSignaturesForAddress` results, served front-first.
    signatures: Mutex<VecDeque<Value>>,
    /// `getTransaction` results by signature; missing entries resolve to
    /// null (pruned detail).
    details: Mutex<HashMap<String, Value>>,
    get_count: AtomicUsize,
    post_count: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one REST envelope for the next GET.
    pub fn with_get_response(self, response: Value) -> Self {
        self.gets.lock().unwrap().push_back(response);
        self
    }

    /// Queues one signature-list result for the next
    /// `getSignaturesForAddress` call.
    pub fn with_signatures(self, result: Value) -> Self {
        self.signatures.lock().unwrap().push_back(result);
        self
    }

    /// Registers a `getTransaction` result for a signature.
    pub fn with_detail(self, signature: &str, result: Value) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(signature.to_string(), result);
        self
    }

    /// GET round trips observed so far.
    pub fn get_count(&self) -> usize {
        self.get_count.load(Ordering::SeqCst)
    }

    /// POST round trips observed so far.
    pub fn post_count(&self) -> usize {
        self.post_count.load(Ordering::SeqCst)
    }

    /// Total round trips of either kind.
    pub fn total_count(&self) -> usize {
        self.get_count() + self.post_count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get_json(&self, _url: &Url, operation: &str) -> Result<Value, TxLensError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        self.gets
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TxLensError::provider("mock", None, format!("no canned GET for {operation}")))
    }

    async fn post_json(
        &self,
        _url: &Url,
        body: Value,
        operation: &str,
    ) -> Result<Value, TxLensError> {
        self.post_count.fetch_add(1, Ordering::SeqCst);
        let method = body["method"].as_str().unwrap_or_default().to_string();
        let result = match method.as_str() {
            "getSignaturesForAddress" => {
                self.signatures.lock().unwrap().pop_front().ok_or_else(|| {
                    TxLensError::provider("mock", None, format!("no canned signatures for {operation}"))
                })?
            }
            "getTransaction" => {
                let signature = body["params"][0].as_str().unwrap_or_default();
                self.details
                    .lock()
                    .unwrap()
                    .get(signature)
                    .cloned()
                    .unwrap_or(Value::Null)
            }
            other => {
                return Err(TxLensError::provider(
                    "mock",
                    None,
                    format!("unexpected rpc method `{other}`"),
                ))
            }
        };
        Ok(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
    }
}

/// A successful REST envelope wrapping raw records.
pub fn etherscan_envelope(records: Vec<Value>) -> Value {
    json!({ "status": "1", "message": "OK", "result": records })
}

/// The benign "no results" REST envelope.
pub fn etherscan_empty_envelope() -> Value {
    json!({ "status": "0", "message": "No transactions found", "result": [] })
}

/// A raw REST indexer record.
pub fn raw_evm_record(hash: &str, timestamp_secs: u64) -> Value {
    json!({
        "hash": hash,
        "blockNumber": "19000000",
        "timeStamp": timestamp_secs.to_string(),
        "from": "0x1111111111111111111111111111111111111111",
        "to": "0x2222222222222222222222222222222222222222",
        "value": "1000000000000000000",
        "gas": "21000",
        "gasPrice": "20000000000",
        "gasUsed": "21000",
        "nonce": "7",
        "isError": "0",
        "txreceipt_status": "1"
    })
}

/// A `getSignaturesForAddress` record.
pub fn signature_record(signature: &str, block_time_secs: i64) -> Value {
    json!({
        "signature": signature,
        "slot": 250000000u64,
        "err": null,
        "memo": null,
        "blockTime": block_time_secs
    })
}

/// A jsonParsed `getTransaction` result.
pub fn transaction_detail(signature: &str, block_time_secs: i64) -> Value {
    json!({
        "slot": 250000000u64,
        "blockTime": block_time_secs,
        "transaction": {
            "message": {
                "accountKeys": [
                    { "pubkey": "FeePayer1111111111111111111111111111111111", "signer": true }
                ],
                "instructions": [],
                "recentBlockhash": "hash"
            },
            "signatures": [signature]
        },
        "meta": {
            "err": null,
            "fee": 5000,
            "preBalances": [10, 0],
            "postBalances": [5, 5]
        }
    })
}
