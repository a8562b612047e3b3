// SPDX-License-Identifier: AGPL-3.0-only
//! # Fee Distributor
//!
//! Swap fees accrue per (pair, input token). The owner periodically folds an
//! accumulator back into the pool: each LP gets
//! `floor(lp_units * collected / total_units)` units and the reserve grows by
//! the full `collected`, so rounding dust stays with the pool.

use crate::pair::{resolve_mutable_pair_key, Side};
use crate::SwapeoDex;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use swapeo_core::{mul_div, Address, DexError, DexEvent, DexResult, PairKey};

/// Pending fees for one pair, per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAccumulator {
    pub collected_a: u128,
    pub collected_b: u128,
}

impl FeeAccumulator {
    pub fn collected(&self, side: Side) -> u128 {
        match side {
            Side::A => self.collected_a,
            Side::B => self.collected_b,
        }
    }

    pub(crate) fn set_collected(&mut self, side: Side, value: u128) {
        match side {
            Side::A => self.collected_a = value,
            Side::B => self.collected_b = value,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeBook {
    accumulators: BTreeMap<PairKey, FeeAccumulator>,
}

impl FeeBook {
    pub fn get(&self, key: &PairKey) -> FeeAccumulator {
        self.accumulators.get(key).copied().unwrap_or_default()
    }

    pub(crate) fn store(&mut self, key: PairKey, acc: FeeAccumulator) {
        self.accumulators.insert(key, acc);
    }
}

/// Per-provider credit from one distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub pair_key: PairKey,
    pub token: Address,
    pub total_fees: u128,
    pub credits: Vec<(Address, u128)>,
    /// Part of `total_fees` not credited to any LP (kept by the reserve)
    pub dust: u128,
}

impl SwapeoDex {
    /// Owner only. Distributes the accumulator for `fee_token` within the
    /// `(token_x, token_y)` pair and zeroes it.
    pub fn distribute_fees(
        &mut self,
        caller: Address,
        token_x: Address,
        token_y: Address,
        fee_token: Address,
    ) -> DexResult<Distribution> {
        self.non_reentrant(|dex| dex.distribute_fees_inner(caller, token_x, token_y, fee_token))
    }

    fn distribute_fees_inner(
        &mut self,
        caller: Address,
        token_x: Address,
        token_y: Address,
        fee_token: Address,
    ) -> DexResult<Distribution> {
        if caller != self.config.owner {
            return Err(DexError::Unauthorized);
        }
        let key = resolve_mutable_pair_key(&token_x, &token_y)?;
        if !self.pairs.contains(&key) {
            return Err(DexError::PairNotFound);
        }

        let mut pair = self.pairs.get(&key);
        let side = pair.side_of(&fee_token).ok_or(DexError::InvalidTokens)?;
        let mut acc = self.fees.get(&key);
        let collected = acc.collected(side);
        if collected == 0 {
            return Err(DexError::NoFees);
        }

        let mut book = self.ledger.get(&key).cloned().unwrap_or_default();
        let total_units = book.total_units(side);
        if total_units == 0 {
            return Err(DexError::PairNotFoundOrEmpty);
        }

        let mut credits = Vec::with_capacity(book.providers().len());
        for provider in book.providers() {
            let units = book.position(provider).units(side);
            let share = mul_div(units, collected, total_units)?;
            credits.push((*provider, share));
        }
        let credited: u128 = credits.iter().map(|(_, share)| *share).sum();
        let new_reserve = pair
            .reserve(side)
            .checked_add(collected)
            .ok_or(DexError::Overflow)?;

        // Effects only: the fee tokens are already held by the contract
        for (provider, share) in &credits {
            if *share > 0 {
                book.credit(*provider, side, *share)?;
            }
        }
        *self.ledger.entry(key) = book;
        pair.set_reserve(side, new_reserve);
        self.pairs.store(key, pair);
        acc.set_collected(side, 0);
        self.fees.store(key, acc);

        let dust = collected - credited;
        debug!(
            "distribute {} token={} collected={} credited={} dust={}",
            key, fee_token, collected, credited, dust
        );
        info!(
            "FeesDistributed: {} {} to {} providers",
            collected,
            fee_token,
            credits.len()
        );
        self.emit(DexEvent::FeesDistributed {
            pair_key: key,
            token: fee_token,
            total_fees: collected,
        });

        Ok(Distribution {
            pair_key: key,
            token: fee_token,
            total_fees: collected,
            credits,
            dust,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_sides() {
        let mut acc = FeeAccumulator::default();
        acc.set_collected(Side::A, 3);
        acc.set_collected(Side::B, 7);
        assert_eq!(acc.collected(Side::A), 3);
        assert_eq!(acc.collected(Side::B), 7);
    }

    #[test]
    fn test_unknown_pair_has_no_fees() {
        let book = FeeBook::default();
        let key = PairKey::of(&Address([1u8; 20]), &Address([2u8; 20]));
        assert_eq!(book.get(&key), FeeAccumulator::default());
    }
}
