// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the txlens library.
//!
//! Every fallible public API returns [`TxLensError`]. Each variant is a
//! machine-readable kind with a structured context payload (the offending
//! input, the provider, status codes), so callers can handle failures
//! programmatically without matching on message strings.
//!
//! Retry classification lives here too: [`TxLensError::retry_disposition`]
//! tells the retry layer whether a failure is fatal, retryable with computed
//! backoff, or retryable after a server-specified delay.

use std::time::Duration;

use crate::types::Network;

/// Unified error type for all txlens operations.
#[derive(Debug, thiserror::Error)]
pub enum TxLensError {
    /// Malformed address or input. Raised before any network call.
    #[error("invalid input `{input}`: {reason}")]
    Validation {
        /// The offending input, verbatim.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Missing or unusable backend configuration.
    #[error("configuration error{}: {reason}", network_suffix(.network))]
    Configuration {
        /// The backend the configuration belongs to, when attributable.
        network: Option<Network>,
        /// What is missing or wrong.
        reason: String,
    },

    /// Connectivity failure reaching a backend.
    #[error("network error during {operation}")]
    Network {
        /// Description of the request that failed.
        operation: String,
        /// The underlying transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A request exceeded its timeout and was aborted.
    #[error("request timed out during {operation}")]
    Timeout {
        /// Description of the request that timed out.
        operation: String,
    },

    /// The remote service refused admission (HTTP 429 or equivalent).
    #[error("rate limited by {provider}")]
    RateLimited {
        /// Provider that refused the request.
        provider: String,
        /// Server-specified delay before retrying, when sent.
        retry_after: Option<Duration>,
    },

    /// The remote service signaled a logical failure.
    #[error("provider {provider} error: {message}")]
    Provider {
        /// Provider that signaled the failure.
        provider: String,
        /// Provider status code, when one was carried.
        status: Option<i64>,
        /// Provider-supplied message.
        message: String,
    },

    /// The rate limiter's drain loop exceeded its iteration cap and
    /// rejected all queued waiters. Indicates a misconfigured limiter,
    /// not a backend failure.
    #[error("rate limiter fault: drain loop exceeded {iterations} iterations")]
    LimiterFault {
        /// Iterations performed before the cap tripped.
        iterations: u32,
    },
}

fn network_suffix(network: &Option<Network>) -> String {
    match network {
        Some(n) => format!(" ({n})"),
        None => String::new(),
    }
}

/// What the retry layer should do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    /// Do not retry; surface immediately.
    Fatal,
    /// Retry with the computed backoff delay.
    Retryable,
    /// Retry after the server-specified delay, overriding backoff.
    RetryableAfter(Duration),
}

impl TxLensError {
    /// Classifies this error for the retry layer.
    ///
    /// Transient network failures and rate-limit rejections are always
    /// retryable; a rate-limit rejection carrying a retry-after duration
    /// overrides the computed backoff. Provider errors are retryable only
    /// when their status code is in `retryable_status`. Validation,
    /// configuration, and limiter faults are always fatal.
    pub fn retry_disposition(&self, retryable_status: &[i64]) -> RetryDisposition {
        match self {
            TxLensError::Network { .. } | TxLensError::Timeout { .. } => {
                RetryDisposition::Retryable
            }
            TxLensError::RateLimited { retry_after, .. } => match retry_after {
                Some(delay) => RetryDisposition::RetryableAfter(*delay),
                None => RetryDisposition::Retryable,
            },
            TxLensError::Provider {
                status: Some(code), ..
            } if retryable_status.contains(code) => RetryDisposition::Retryable,
            _ => RetryDisposition::Fatal,
        }
    }

    /// Helper to create a `Validation` error.
    pub fn validation(input: impl Into<String>, reason: impl Into<String>) -> Self {
        TxLensError::Validation {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Helper to create a `Configuration` error attributed to a network.
    pub fn configuration(network: Network, reason: impl Into<String>) -> Self {
        TxLensError::Configuration {
            network: Some(network),
            reason: reason.into(),
        }
    }

    /// Helper to create a `Network` error from any transport error.
    pub fn network(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TxLensError::Network {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `Provider` error.
    pub fn provider(
        provider: impl Into<String>,
        status: Option<i64>,
        message: impl Into<String>,
    ) -> Self {
        TxLensError::Provider {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETRYABLE: &[i64] = &[408, 429, 500, 502, 503, 504];

    #[test]
    fn validation_is_fatal() {
        let err = TxLensError::validation("0xzz", "not hex");
        assert_eq!(err.retry_disposition(RETRYABLE), RetryDisposition::Fatal);
    }

    #[test]
    fn configuration_is_fatal() {
        let err = TxLensError::configuration(Network::Solana, "missing rpc url");
        assert_eq!(err.retry_disposition(RETRYABLE), RetryDisposition::Fatal);
    }

    #[test]
    fn timeout_is_retryable() {
        let err = TxLensError::Timeout {
            operation: "txlist".to_string(),
        };
        assert_eq!(
            err.retry_disposition(RETRYABLE),
            RetryDisposition::Retryable
        );
    }

    #[test]
    fn rate_limit_with_retry_after_overrides_backoff() {
        let err = TxLensError::RateLimited {
            provider: "etherscan".to_string(),
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(
            err.retry_disposition(RETRYABLE),
            RetryDisposition::RetryableAfter(Duration::from_secs(7))
        );
    }

    #[test]
    fn provider_status_checked_against_set() {
        let retryable = TxLensError::provider("solana-rpc", Some(503), "unavailable");
        assert_eq!(
            retryable.retry_disposition(RETRYABLE),
            RetryDisposition::Retryable
        );

        let fatal = TxLensError::provider("solana-rpc", Some(-32602), "invalid params");
        assert_eq!(fatal.retry_disposition(RETRYABLE), RetryDisposition::Fatal);

        let no_status = TxLensError::provider("etherscan", None, "NOTOK");
        assert_eq!(
            no_status.retry_disposition(RETRYABLE),
            RetryDisposition::Fatal
        );
    }

    #[test]
    fn limiter_fault_is_fatal() {
        let err = TxLensError::LimiterFault { iterations: 10_000 };
        assert_eq!(err.retry_disposition(RETRYABLE), RetryDisposition::Fatal);
    }

    #[test]
    fn display_carries_context() {
        let err = TxLensError::validation("bogus", "unrecognized format");
        assert_eq!(
            err.to_string(),
            "invalid input `bogus`: unrecognized format"
        );

        let err = TxLensError::configuration(Network::Ethereum, "missing api key");
        assert!(err.to_string().contains("ethereum"));
    }
}
