// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain adapters.
//!
//! An adapter validates and normalizes the caller's address, drives its
//! provider, and applies the post-fetch time-range filter. Validation
//! always happens before any network call, so a malformed address never
//! produces a fetch side effect.

pub mod ethereum;
pub mod solana;

pub use ethereum::EthereumAdapter;
pub use solana::SolanaAdapter;

use crate::types::{TimestampMillis, Transaction};

/// Retains transactions whose timestamp falls in `[start, end]` (either
/// bound optional, both inclusive).
///
/// Neither backend filters by time natively, so this runs after the fetch:
/// a filtered page can be shorter than the requested limit while
/// `has_more`/`next_cursor` still describe the unfiltered upstream page.
/// Records without a timestamp are dropped only when a bound is set, since
/// their membership cannot be established.
pub(crate) fn filter_by_time_range(
    transactions: &mut Vec<Transaction>,
    start: Option<TimestampMillis>,
    end: Option<TimestampMillis>,
) {
    if start.is_none() && end.is_none() {
        return;
    }
    transactions.retain(|tx| match tx.timestamp() {
        Some(ts) => start.is_none_or(|s| ts >= s) && end.is_none_or(|e| ts <= e),
        None => false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EvmTransaction, TransactionStatus};

    fn tx_at(secs: u64) -> Transaction {
        Transaction::Ethereum(EvmTransaction {
            hash: format!("0x{secs}"),
            block_number: secs,
            timestamp: TimestampMillis::from_secs(secs),
            status: TransactionStatus::Success,
            from: "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string(),
            to: None,
            value: 0,
            gas_limit: 21_000,
            gas_price: 0,
            gas_used: None,
            fee: None,
            nonce: 0,
        })
    }

    #[test]
    fn no_bounds_keeps_everything() {
        let mut txs = vec![tx_at(10), tx_at(20)];
        filter_by_time_range(&mut txs, None, None);
        assert_eq!(txs.len(), 2);
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut txs = vec![tx_at(10), tx_at(20), tx_at(30)];
        filter_by_time_range(
            &mut txs,
            Some(TimestampMillis::from_secs(10)),
            Some(TimestampMillis::from_secs(20)),
        );
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].position(), 10);
        assert_eq!(txs[1].position(), 20);
    }

    #[test]
    fn single_sided_bounds() {
        let mut txs = vec![tx_at(10), tx_at(20), tx_at(30)];
        filter_by_time_range(&mut txs, Some(TimestampMillis::from_secs(20)), None);
        assert_eq!(txs.len(), 2);

        let mut txs = vec![tx_at(10), tx_at(20), tx_at(30)];
        filter_by_time_range(&mut txs, None, Some(TimestampMillis::from_secs(20)));
        assert_eq!(txs.len(), 2);
    }
}
