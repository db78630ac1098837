// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The unified transaction model.
//!
//! [`Transaction`] is a tagged union over the two backend-native shapes.
//! The network tag is the discriminant: it is fixed at construction by the
//! adapter that produced the record and there is no way to change it or to
//! reach the other variant's fields without matching on the tag first.

use serde::{Deserialize, Serialize};

use super::{Network, TimestampMillis};

/// Execution status shared by both variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Included and executed successfully.
    Success,
    /// Included but reverted or errored on-chain.
    Failed,
    /// Observed but not yet finalized (no block time available).
    Pending,
}

/// An Ethereum transaction as reported by the REST indexer.
///
/// Amounts are native units: `value`, `gas_price` and `fee` are wei.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmTransaction {
    /// Transaction hash (`0x`-prefixed, lowercase).
    pub hash: String,
    /// Block number the transaction was included in.
    pub block_number: u64,
    /// Block timestamp.
    pub timestamp: TimestampMillis,
    /// Execution status.
    pub status: TransactionStatus,
    /// Sender address (lowercase).
    pub from: String,
    /// Recipient address (lowercase). `None` for contract creation.
    pub to: Option<String>,
    /// Transferred value in wei.
    pub value: u128,
    /// Gas limit supplied with the transaction.
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Gas actually consumed, when the indexer reports it.
    pub gas_used: Option<u64>,
    /// Total fee in wei (`gas_used * gas_price`), when computable.
    pub fee: Option<u128>,
    /// Sender nonce.
    pub nonce: u64,
}

/// A Solana transaction assembled from a signature record and its detail.
///
/// Amounts are native units: `fee` is lamports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolanaTransaction {
    /// Base58 transaction signature.
    pub signature: String,
    /// Slot the transaction was processed in.
    pub slot: u64,
    /// Block time. `None` when the node has not yet assigned one.
    pub timestamp: Option<TimestampMillis>,
    /// Execution status.
    pub status: TransactionStatus,
    /// Fee in lamports.
    pub fee: Option<u64>,
    /// Compute units consumed, when the node reports them.
    pub compute_units: Option<u64>,
    /// Fee payer (first account key).
    pub fee_payer: Option<String>,
    /// Every account referenced by the transaction message.
    pub account_keys: Vec<String>,
    /// Top-level instructions, summarized.
    pub instructions: Vec<InstructionSummary>,
    /// Per-account token balance changes.
    pub token_balance_deltas: Vec<TokenBalanceDelta>,
    /// Memo attached to the signature record, if any.
    pub memo: Option<String>,
}

/// Summary of one instruction in a Solana transaction message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSummary {
    /// Program the instruction targets.
    pub program_id: String,
    /// Friendly program name, when the node parsed the instruction.
    pub program: Option<String>,
    /// Parsed instruction type (e.g. `transfer`), when available.
    pub instruction_type: Option<String>,
}

/// Token balance movement for one account within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalanceDelta {
    /// Index into the transaction's account key list.
    pub account_index: u64,
    /// Token mint address.
    pub mint: String,
    /// Owning wallet, when reported.
    pub owner: Option<String>,
    /// Raw token amount before the transaction.
    pub pre_amount: u128,
    /// Raw token amount after the transaction.
    pub post_amount: u128,
    /// Token decimals.
    pub decimals: u8,
}

/// A transaction from either supported network.
///
/// The serde representation tags each record with its network, matching the
/// [`Network`] discriminant:
///
/// ```json
/// { "network": "ethereum", "hash": "0x...", ... }
/// { "network": "solana", "signature": "...", ... }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "network", rename_all = "lowercase")]
pub enum Transaction {
    /// Produced by the Ethereum adapter.
    Ethereum(EvmTransaction),
    /// Produced by the Solana adapter.
    Solana(SolanaTransaction),
}

impl Transaction {
    /// The network that produced this transaction.
    pub fn network(&self) -> Network {
        match self {
            Transaction::Ethereum(_) => Network::Ethereum,
            Transaction::Solana(_) => Network::Solana,
        }
    }

    /// Chain-level identity: transaction hash or signature.
    pub fn id(&self) -> &str {
        match self {
            Transaction::Ethereum(tx) => &tx.hash,
            Transaction::Solana(tx) => &tx.signature,
        }
    }

    /// Chain-native position marker: block number or slot.
    pub fn position(&self) -> u64 {
        match self {
            Transaction::Ethereum(tx) => tx.block_number,
            Transaction::Solana(tx) => tx.slot,
        }
    }

    /// Block time. `None` only for Solana records without a block time.
    pub fn timestamp(&self) -> Option<TimestampMillis> {
        match self {
            Transaction::Ethereum(tx) => Some(tx.timestamp),
            Transaction::Solana(tx) => tx.timestamp,
        }
    }

    /// Execution status.
    pub fn status(&self) -> TransactionStatus {
        match self {
            Transaction::Ethereum(tx) => tx.status,
            Transaction::Solana(tx) => tx.status,
        }
    }

    /// Fee in the chain's native base unit (wei or lamports).
    pub fn fee(&self) -> Option<u128> {
        match self {
            Transaction::Ethereum(tx) => tx.fee,
            Transaction::Solana(tx) => tx.fee.map(u128::from),
        }
    }

    /// Execution resource usage: gas used or compute units consumed.
    pub fn resource_usage(&self) -> Option<u64> {
        match self {
            Transaction::Ethereum(tx) => tx.gas_used,
            Transaction::Solana(tx) => tx.compute_units,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_evm() -> EvmTransaction {
        EvmTransaction {
            hash: "0xabc".to_string(),
            block_number: 19_000_000,
            timestamp: TimestampMillis::from_secs(1_700_000_000),
            status: TransactionStatus::Success,
            from: "0x1111111111111111111111111111111111111111".to_string(),
            to: Some("0x2222222222222222222222222222222222222222".to_string()),
            value: 1_000_000_000_000_000_000,
            gas_limit: 21_000,
            gas_price: 20_000_000_000,
            gas_used: Some(21_000),
            fee: Some(21_000 * 20_000_000_000),
            nonce: 7,
        }
    }

    fn sample_solana() -> SolanaTransaction {
        SolanaTransaction {
            signature: "5Nf".to_string(),
            slot: 250_000_000,
            timestamp: Some(TimestampMillis::from_secs(1_700_000_100)),
            status: TransactionStatus::Success,
            fee: Some(5_000),
            compute_units: Some(1_400),
            fee_payer: Some("FeePayer111".to_string()),
            account_keys: vec!["FeePayer111".to_string()],
            instructions: vec![],
            token_balance_deltas: vec![],
            memo: None,
        }
    }

    #[test]
    fn network_tag_matches_variant() {
        assert_eq!(
            Transaction::Ethereum(sample_evm()).network(),
            Network::Ethereum
        );
        assert_eq!(
            Transaction::Solana(sample_solana()).network(),
            Network::Solana
        );
    }

    #[test]
    fn common_accessors() {
        let tx = Transaction::Ethereum(sample_evm());
        assert_eq!(tx.id(), "0xabc");
        assert_eq!(tx.position(), 19_000_000);
        assert_eq!(tx.fee(), Some(420_000_000_000_000));
        assert_eq!(tx.resource_usage(), Some(21_000));

        let tx = Transaction::Solana(sample_solana());
        assert_eq!(tx.id(), "5Nf");
        assert_eq!(tx.position(), 250_000_000);
        assert_eq!(tx.fee(), Some(5_000));
    }

    #[test]
    fn serde_tags_with_network() {
        let json = serde_json::to_value(Transaction::Solana(sample_solana())).unwrap();
        assert_eq!(json["network"], "solana");
        assert_eq!(json["signature"], "5Nf");

        let json = serde_json::to_value(Transaction::Ethereum(sample_evm())).unwrap();
        assert_eq!(json["network"], "ethereum");

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back.network(), Network::Ethereum);
    }
}
