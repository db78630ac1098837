// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for the unified transaction model.
//!
//! This module provides the data model shared by every layer:
//! - The [`Network`] discriminant
//! - Millisecond timestamps ([`TimestampMillis`])
//! - The [`Transaction`] tagged union and its variant payloads
//! - Pagination options and metadata

pub mod network;
pub mod pagination;
pub mod timestamp;
pub mod transaction;

pub use network::{Network, UnknownNetwork};
pub use pagination::{
    PaginationMetadata, PaginationOptions, TransactionPage, DEFAULT_PAGE_LIMIT,
};
pub use timestamp::TimestampMillis;
pub use transaction::{
    EvmTransaction, InstructionSummary, SolanaTransaction, TokenBalanceDelta, Transaction,
    TransactionStatus,
};
