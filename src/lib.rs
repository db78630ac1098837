// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # txlens
//!
//! Unified blockchain transaction history: one query surface over an
//! Etherscan-compatible REST indexer (Ethereum) and a Solana JSON-RPC
//! node.
//!
//! The library normalizes two incompatible backends (offset-paged vs.
//! cursor-paged pagination, two unrelated transaction shapes) into a
//! single discriminated [`Transaction`] type, behind a facade that
//! auto-detects the network from the address format. Every backend call
//! runs through per-provider token-bucket rate limiting and retry with
//! exponential backoff; full result pages are cached with TTL and bounded
//! eviction.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use txlens::{EtherscanConfig, PaginationOptions, SolanaConfig, TxLens, TxLensConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), txlens::TxLensError> {
//!     let client = TxLens::new(
//!         TxLensConfig::builder()
//!             .ethereum(EtherscanConfig::public_endpoint("MY-API-KEY"))
//!             .solana(SolanaConfig::public_endpoint("https://api.mainnet-beta.solana.com"))
//!             .build(),
//!     )?;
//!
//!     // Network is detected from the address format.
//!     let page = client
//!         .get_transactions(
//!             "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae",
//!             &PaginationOptions::default().with_limit(10),
//!         )
//!         .await?;
//!
//!     for tx in &page.data {
//!         println!("{} {} {:?}", tx.network(), tx.id(), tx.status());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! The library emits [`tracing`] events and never installs a subscriber;
//! configure `tracing-subscriber` (or any other subscriber) in your
//! application to see them.

pub mod adapters;
pub mod cache;
mod client;
mod config;
pub mod errors;
pub mod limiter;
pub mod providers;
pub mod retry;
pub mod transport;
pub mod types;

pub use cache::{BoundedTtlCache, CacheStats, QueryCache, QueryCacheConfig};
pub use client::TxLens;
pub use config::{TxLensConfig, TxLensConfigBuilder};
pub use errors::{RetryDisposition, TxLensError};
pub use limiter::{DualWindowRateLimiter, RateLimiterConfig};
pub use providers::{EtherscanConfig, SolanaConfig};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::{
    EvmTransaction, InstructionSummary, Network, PaginationMetadata, PaginationOptions,
    SolanaTransaction, TimestampMillis, TokenBalanceDelta, Transaction, TransactionPage,
    TransactionStatus,
};
