// SPDX-License-Identifier: AGPL-3.0-only
//! # Query Surface
//!
//! Read-only views over pair, LP and fee state for callers and indexers.
//! Nothing here mutates the DEX. Unknown pairs answer with zeroed records
//! rather than errors, except where a view needs a token to belong to a pair.

use crate::pair::{resolve_pair_key, Pair, PairState};
use crate::SwapeoDex;
use serde::{Deserialize, Serialize};
use swapeo_core::{mul_div, u128_str, Address, DexError, DexResult, PairKey, BPS_DENOMINATOR};

/// Pair snapshot with accounting totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub pair_key: PairKey,
    pub token_a: Address,
    pub token_b: Address,
    #[serde(with = "u128_str")]
    pub reserve_a: u128,
    #[serde(with = "u128_str")]
    pub reserve_b: u128,
    #[serde(with = "u128_str")]
    pub total_units_a: u128,
    #[serde(with = "u128_str")]
    pub total_units_b: u128,
    #[serde(with = "u128_str")]
    pub fees_a: u128,
    #[serde(with = "u128_str")]
    pub fees_b: u128,
    pub providers: usize,
    pub state: PairState,
}

/// A provider's position in one pair, with what it would redeem today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub pair_key: PairKey,
    pub provider: Address,
    #[serde(with = "u128_str")]
    pub units_a: u128,
    #[serde(with = "u128_str")]
    pub units_b: u128,
    #[serde(with = "u128_str")]
    pub redeemable_a: u128,
    #[serde(with = "u128_str")]
    pub redeemable_b: u128,
    /// Share of the side's total units, in bps
    pub share_a_bps: u128,
    pub share_b_bps: u128,
}

fn share_bps(units: u128, total: u128) -> DexResult<u128> {
    if total == 0 {
        return Ok(0);
    }
    mul_div(units, BPS_DENOMINATOR, total)
}

impl SwapeoDex {
    /// Reserve record for a token pair. Unknown pairs yield zero reserves
    /// and `exists = false`.
    pub fn get_pair(&self, token_x: &Address, token_y: &Address) -> DexResult<Pair> {
        resolve_pair_key(token_x, token_y)?;
        Ok(self.pairs.get_by_tokens(token_x, token_y))
    }

    pub fn pair_by_key(&self, key: &PairKey) -> Option<Pair> {
        self.pairs.contains(key).then(|| self.pairs.get(key))
    }

    pub fn pair_state(&self, token_x: &Address, token_y: &Address) -> DexResult<PairState> {
        Ok(self.get_pair(token_x, token_y)?.state())
    }

    pub fn pool_info(&self, key: &PairKey) -> Option<PoolInfo> {
        let pair = self.pair_by_key(key)?;
        let book = self.ledger.get(key);
        let fees = self.fees.get(key);
        Some(PoolInfo {
            pair_key: *key,
            token_a: pair.token_a,
            token_b: pair.token_b,
            reserve_a: pair.reserve_a,
            reserve_b: pair.reserve_b,
            total_units_a: book.map(|b| b.total_units_a).unwrap_or(0),
            total_units_b: book.map(|b| b.total_units_b).unwrap_or(0),
            fees_a: fees.collected_a,
            fees_b: fees.collected_b,
            providers: book.map(|b| b.providers().len()).unwrap_or(0),
            state: pair.state(),
        })
    }

    /// All pairs ever created, in creation order.
    pub fn list_pairs(&self) -> Vec<PoolInfo> {
        self.pairs
            .iter()
            .filter_map(|(key, _)| self.pool_info(key))
            .collect()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// LP units of `token` held by `provider` in the `(token_x, token_y)` pair.
    /// Zero when the pair or position does not exist.
    pub fn lp_balance(
        &self,
        token_x: &Address,
        token_y: &Address,
        token: &Address,
        provider: &Address,
    ) -> DexResult<u128> {
        let key = resolve_pair_key(token_x, token_y)?;
        let pair = self.pairs.get_by_tokens(token_x, token_y);
        let side = pair.side_of(token).ok_or(DexError::InvalidTokens)?;
        Ok(self
            .ledger
            .get(&key)
            .map(|book| book.position(provider).units(side))
            .unwrap_or(0))
    }

    /// Providers with a non-zero position, in registry order.
    pub fn lp_providers(&self, token_x: &Address, token_y: &Address) -> DexResult<Vec<Address>> {
        let key = resolve_pair_key(token_x, token_y)?;
        Ok(self
            .ledger
            .get(&key)
            .map(|book| book.providers().to_vec())
            .unwrap_or_default())
    }

    pub fn position(
        &self,
        token_x: &Address,
        token_y: &Address,
        provider: &Address,
    ) -> DexResult<Position> {
        let key = resolve_pair_key(token_x, token_y)?;
        let pair = self.pairs.get_by_tokens(token_x, token_y);
        let book = self.ledger.get(&key).cloned().unwrap_or_default();
        let lp = book.position(provider);

        Ok(Position {
            pair_key: key,
            provider: *provider,
            units_a: lp.units_a,
            units_b: lp.units_b,
            redeemable_a: crate::amount_for_units(lp.units_a, pair.reserve_a, book.total_units_a)?,
            redeemable_b: crate::amount_for_units(lp.units_b, pair.reserve_b, book.total_units_b)?,
            share_a_bps: share_bps(lp.units_a, book.total_units_a)?,
            share_b_bps: share_bps(lp.units_b, book.total_units_b)?,
        })
    }

    /// Undistributed swap fees for `token` in the `(token_x, token_y)` pair.
    pub fn fees_collected(
        &self,
        token_x: &Address,
        token_y: &Address,
        token: &Address,
    ) -> DexResult<u128> {
        let key = resolve_pair_key(token_x, token_y)?;
        let pair = self.pairs.get_by_tokens(token_x, token_y);
        let side = pair.side_of(token).ok_or(DexError::InvalidTokens)?;
        Ok(self.fees.get(&key).collected(side))
    }

    /// Forwarding fees retained in `token`.
    pub fn protocol_fees(&self, token: &Address) -> u128 {
        self.protocol_fees.get(token).copied().unwrap_or(0)
    }
}
