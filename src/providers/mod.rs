// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Backend providers.
//!
//! A provider owns the wire protocol, rate limiting, and retry behavior
//! for one backend and emits backend-native records mapped into the
//! unified shape. Each provider owns its own
//! [`DualWindowRateLimiter`](crate::DualWindowRateLimiter) and
//! [`RetryPolicy`](crate::RetryPolicy); nothing is shared across
//! backends.

pub mod etherscan;
pub mod solana;

pub use etherscan::{EtherscanConfig, EtherscanProvider};
pub use solana::{SolanaConfig, SolanaProvider};
