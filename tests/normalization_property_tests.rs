// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Property tests for address normalization and the canonical cache key.

use proptest::prelude::*;
use txlens::adapters::{ethereum, solana};
use txlens::{Network, PaginationOptions, QueryCache, TimestampMillis, TxLens};

/// Strategy for valid hex addresses with arbitrary casing.
fn hex_address_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        proptest::sample::select(
            "0123456789abcdefABCDEF".chars().collect::<Vec<_>>(),
        ),
        40,
    )
    .prop_map(|chars| format!("0x{}", chars.into_iter().collect::<String>()))
}

/// Strategy for valid base58 public keys.
fn base58_key_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        proptest::sample::select(
            "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz"
                .chars()
                .collect::<Vec<_>>(),
        ),
        32..=44,
    )
    .prop_map(|chars| chars.into_iter().collect::<String>())
}

proptest! {
    /// Hex normalization is pure lowercase folding and idempotent.
    #[test]
    fn hex_normalization_is_idempotent_lowercase(address in hex_address_strategy()) {
        let once = ethereum::normalize_address(&address).unwrap();
        prop_assert_eq!(&once, &address.to_lowercase());
        let twice = ethereum::normalize_address(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Base58 normalization is the identity.
    #[test]
    fn base58_normalization_is_identity(key in base58_key_strategy()) {
        let normalized = solana::normalize_pubkey(&key).unwrap();
        prop_assert_eq!(normalized, key);
    }

    /// Every valid hex address detects as Ethereum, every valid base58 key
    /// as Solana.
    #[test]
    fn detection_matches_format(
        address in hex_address_strategy(),
        key in base58_key_strategy(),
    ) {
        prop_assert_eq!(TxLens::detect_network(&address).unwrap(), Network::Ethereum);
        prop_assert_eq!(TxLens::detect_network(&key).unwrap(), Network::Solana);
    }

    /// The cache key depends only on query fields, never on input casing
    /// (after normalization) or the bypass flag.
    #[test]
    fn cache_key_is_casing_stable(
        address in hex_address_strategy(),
        limit in 1u32..1000,
        page in proptest::option::of(1u32..100),
        start in proptest::option::of(0u64..2_000_000_000_000),
    ) {
        let options = PaginationOptions {
            limit,
            page,
            cursor: None,
            start_time: start.map(TimestampMillis::from_millis),
            end_time: None,
            bypass_cache: false,
        };
        let upper = ethereum::normalize_address(&address.to_uppercase().replace("0X", "0x")).unwrap();
        let lower = ethereum::normalize_address(&address.to_lowercase()).unwrap();

        let key_a = QueryCache::key(Network::Ethereum, &upper, &options);
        let mut bypassing = options.clone();
        bypassing.bypass_cache = true;
        let key_b = QueryCache::key(Network::Ethereum, &lower, &bypassing);
        prop_assert_eq!(key_a, key_b);
    }
}
