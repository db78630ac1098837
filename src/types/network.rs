// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Network discriminant for the unified transaction model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The blockchain network a transaction or query belongs to.
///
/// This is the discriminant used throughout the unified data model: every
/// [`Transaction`](crate::Transaction) carries the network that produced it,
/// and cache keys embed it so queries against different networks never
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Ethereum, served by an Etherscan-compatible REST indexer.
    Ethereum,
    /// Solana, served by a JSON-RPC node.
    Solana,
}

impl Network {
    /// Canonical lowercase name, used in cache keys and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Solana => "solana",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" | "eth" => Ok(Network::Ethereum),
            "solana" | "sol" => Ok(Network::Solana),
            other => Err(UnknownNetwork {
                name: other.to_string(),
            }),
        }
    }
}

/// Error returned when parsing an unrecognized network name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown network: {name}")]
pub struct UnknownNetwork {
    /// The name that failed to parse.
    pub name: String,
}
