// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Ethereum adapter: hex-address validation and normalization.

use tracing::debug;

use super::filter_by_time_range;
use crate::errors::TxLensError;
use crate::providers::EtherscanProvider;
use crate::types::{PaginationOptions, TransactionPage};

/// Whether `input` is a well-formed hex address: `0x` plus 40 hex
/// characters, case-insensitive.
pub fn is_valid_address(input: &str) -> bool {
    let Some(hex) = input.strip_prefix("0x") else {
        return false;
    };
    hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Validates and normalizes a hex address to lowercase.
///
/// Normalization is pure lowercase folding and therefore idempotent.
pub fn normalize_address(input: &str) -> Result<String, TxLensError> {
    if !is_valid_address(input) {
        return Err(TxLensError::validation(
            input,
            "expected a 0x-prefixed 40-character hex address",
        ));
    }
    Ok(input.to_ascii_lowercase())
}

/// Adapter from the REST indexer's shape to the unified shape.
#[derive(Debug)]
pub struct EthereumAdapter {
    provider: EtherscanProvider,
}

impl EthereumAdapter {
    /// Wraps a configured provider.
    pub fn new(provider: EtherscanProvider) -> Self {
        Self { provider }
    }

    /// Fetches one page of unified transactions for `address`.
    ///
    /// The address is validated and case-folded before any network call;
    /// the time-range filter is applied after the fetch.
    pub async fn get_transactions(
        &self,
        address: &str,
        options: &PaginationOptions,
    ) -> Result<TransactionPage, TxLensError> {
        let normalized = normalize_address(address)?;
        let mut page = self.provider.get_transactions(&normalized, options).await?;

        let before = page.data.len();
        filter_by_time_range(&mut page.data, options.start_time, options.end_time);
        if page.data.len() != before {
            debug!(
                dropped = before - page.data.len(),
                "time-range filter narrowed ethereum page"
            );
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "0xDe0B295669a9FD93d5F28D9Ec85E40f4cb697BAe";

    #[test]
    fn accepts_well_formed_addresses() {
        assert!(is_valid_address(VALID));
        assert!(is_valid_address(&VALID.to_lowercase()));
        assert!(is_valid_address(&VALID.to_uppercase().replace("0X", "0x")));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("0x"));
        assert!(!is_valid_address("de0b295669a9fd93d5f28d9ec85e40f4cb697bae")); // no prefix
        assert!(!is_valid_address("0xde0b295669a9fd93d5f28d9ec85e40f4cb697ba")); // 39 chars
        assert!(!is_valid_address("0xde0b295669a9fd93d5f28d9ec85e40f4cb697baez")); // non-hex
    }

    #[test]
    fn normalization_is_lowercase_folding() {
        let normalized = normalize_address(VALID).unwrap();
        assert_eq!(normalized, VALID.to_lowercase());
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_address(VALID).unwrap();
        let twice = normalize_address(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn validation_error_carries_input() {
        let err = normalize_address("bogus").unwrap_err();
        match err {
            TxLensError::Validation { input, .. } => assert_eq!(input, "bogus"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
