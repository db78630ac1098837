// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport seam.
//!
//! Providers speak to their backends through the [`HttpTransport`] trait
//! rather than a concrete client, so tests can substitute mock transports
//! that count round trips and replay canned envelopes. The production
//! implementation is [`ReqwestTransport`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::errors::TxLensError;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal JSON-over-HTTP transport used by both providers.
///
/// `operation` is a short human-readable description of the request (e.g.
/// `"etherscan txlist"`) carried into error context.
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// Issues a GET and parses the response body as JSON.
    async fn get_json(&self, url: &Url, operation: &str) -> Result<Value, TxLensError>;

    /// Issues a POST with a JSON body and parses the response as JSON.
    async fn post_json(&self, url: &Url, body: Value, operation: &str)
        -> Result<Value, TxLensError>;
}

/// Production transport over a pooled `reqwest` client.
///
/// Maps transport failures into the error taxonomy:
/// - request timeout → [`TxLensError::Timeout`]
/// - connectivity failure → [`TxLensError::Network`]
/// - HTTP 429 → [`TxLensError::RateLimited`] with the `Retry-After`
///   header when present
/// - other non-2xx status → [`TxLensError::Provider`] carrying the status
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TxLensError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TxLensError::Configuration {
                network: None,
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// Creates a transport with the default timeout.
    pub fn with_default_timeout() -> Result<Self, TxLensError> {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }

    fn map_send_error(operation: &str, error: reqwest::Error) -> TxLensError {
        if error.is_timeout() {
            TxLensError::Timeout {
                operation: operation.to_string(),
            }
        } else {
            TxLensError::network(operation, error)
        }
    }

    async fn handle_response(
        url: &Url,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<Value, TxLensError> {
        let provider = url.host_str().unwrap_or("unknown").to_string();
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(TxLensError::RateLimited {
                provider,
                retry_after,
            });
        }

        if !status.is_success() {
            return Err(TxLensError::provider(
                provider,
                Some(i64::from(status.as_u16())),
                format!("HTTP {status}"),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Self::map_send_error(operation, e))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &Url, operation: &str) -> Result<Value, TxLensError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Self::map_send_error(operation, e))?;
        Self::handle_response(url, operation, response).await
    }

    async fn post_json(
        &self,
        url: &Url,
        body: Value,
        operation: &str,
    ) -> Result<Value, TxLensError> {
        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_send_error(operation, e))?;
        Self::handle_response(url, operation, response).await
    }
}
