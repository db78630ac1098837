// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Solana adapter: base58 public key validation.
//!
//! Base58 keys are case-significant, so unlike the hex path there is no
//! case folding: normalization is identity.

use tracing::debug;

use super::filter_by_time_range;
use crate::errors::TxLensError;
use crate::providers::SolanaProvider;
use crate::types::{PaginationOptions, TransactionPage};

/// The 58-symbol alphabet: alphanumerics minus the visually ambiguous
/// `0`, `O`, `I`, and `l`.
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Whether `input` is a plausible base58-encoded public key: 32 to 44
/// characters drawn from the base58 alphabet.
pub fn is_valid_pubkey(input: &str) -> bool {
    (32..=44).contains(&input.len()) && input.chars().all(|c| BASE58_ALPHABET.contains(c))
}

/// Validates a base58 public key. Case is semantically significant, so the
/// returned key is the input unchanged.
pub fn normalize_pubkey(input: &str) -> Result<String, TxLensError> {
    if !is_valid_pubkey(input) {
        return Err(TxLensError::validation(
            input,
            "expected a 32-44 character base58-encoded public key",
        ));
    }
    Ok(input.to_string())
}

/// Adapter from the JSON-RPC node's shape to the unified shape.
#[derive(Debug)]
pub struct SolanaAdapter {
    provider: SolanaProvider,
}

impl SolanaAdapter {
    /// Wraps a configured provider.
    pub fn new(provider: SolanaProvider) -> Self {
        Self { provider }
    }

    /// Fetches one page of unified transactions for `address`.
    ///
    /// The key is validated before any network call; the time-range filter
    /// is applied after the fetch.
    pub async fn get_transactions(
        &self,
        address: &str,
        options: &PaginationOptions,
    ) -> Result<TransactionPage, TxLensError> {
        let normalized = normalize_pubkey(address)?;
        let mut page = self.provider.get_transactions(&normalized, options).await?;

        let before = page.data.len();
        filter_by_time_range(&mut page.data, options.start_time, options.end_time);
        if page.data.len() != before {
            debug!(
                dropped = before - page.data.len(),
                "time-range filter narrowed solana page"
            );
        }
        Ok(page)
    }
}
