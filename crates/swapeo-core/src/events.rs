//! Events emitted by the DEX and consumed by the off-chain indexer.
//! Shapes are stable: the indexer keys on the `event` tag.

use crate::address::{Address, PairKey};
use crate::u128_str;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum DexEvent {
    /// Liquidity added. Tokens and amounts are in canonical pair order.
    Deposit {
        provider: Address,
        token_a: Address,
        token_b: Address,
        #[serde(with = "u128_str")]
        amount_a: u128,
        #[serde(with = "u128_str")]
        amount_b: u128,
    },
    /// Liquidity removed. Amounts are what was actually paid out.
    Withdraw {
        provider: Address,
        token_a: Address,
        token_b: Address,
        #[serde(with = "u128_str")]
        amount_a: u128,
        #[serde(with = "u128_str")]
        amount_b: u128,
    },
    Swap {
        user: Address,
        token_in: Address,
        token_out: Address,
        #[serde(with = "u128_str")]
        amount_in: u128,
        #[serde(with = "u128_str")]
        amount_out: u128,
        #[serde(with = "u128_str")]
        fee: u128,
    },
    FeesDistributed {
        pair_key: PairKey,
        token: Address,
        #[serde(with = "u128_str")]
        total_fees: u128,
    },
    /// Swap delegated to the external router.
    Forwarded {
        user: Address,
        token_in: Address,
        token_out: Address,
        #[serde(with = "u128_str")]
        amount_in: u128,
        #[serde(with = "u128_str")]
        amount_out: u128,
        #[serde(with = "u128_str")]
        fee: u128,
    },
}

impl DexEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DexEvent::Deposit { .. } => "Deposit",
            DexEvent::Withdraw { .. } => "Withdraw",
            DexEvent::Swap { .. } => "Swap",
            DexEvent::FeesDistributed { .. } => "FeesDistributed",
            DexEvent::Forwarded { .. } => "Forwarded",
        }
    }
}
