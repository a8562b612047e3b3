//! # Mock Uniswap-V2 Router
//!
//! Stand-in for the external router the DEX forwards to. Quotes and swaps
//! follow the V2 formula with a 0.3% fee:
//!
//! ```text
//! amount_in_with_fee = amount_in * (10_000 - fee_bps)
//! amount_out = amount_in_with_fee * reserve_out / (reserve_in * 10_000 + amount_in_with_fee)
//! ```
//!
//! This module only keeps the reserve books. Token movements are done by
//! the chain host, which holds the router's balances in the token bank.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use swapeo_core::address::sort_tokens;
use swapeo_core::{u128_str, Address, PairKey};

/// Uniswap V2 swap fee
pub const ROUTER_FEE_BPS: u128 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterPool {
    pub token_a: Address,
    pub token_b: Address,
    #[serde(with = "u128_str")]
    pub reserve_a: u128,
    #[serde(with = "u128_str")]
    pub reserve_b: u128,
}

impl RouterPool {
    /// `(reserve_in, reserve_out)` for a hop from `token_in`.
    fn oriented(&self, token_in: &Address) -> (u128, u128) {
        if *token_in == self.token_a {
            (self.reserve_a, self.reserve_b)
        } else {
            (self.reserve_b, self.reserve_a)
        }
    }

    fn apply(&mut self, token_in: &Address, amount_in: u128, amount_out: u128) {
        if *token_in == self.token_a {
            self.reserve_a += amount_in;
            self.reserve_b -= amount_out;
        } else {
            self.reserve_b += amount_in;
            self.reserve_a -= amount_out;
        }
    }
}

pub fn router_amount_out(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
    fee_bps: u128,
) -> Result<u128, String> {
    if amount_in == 0 {
        return Err("INSUFFICIENT_INPUT_AMOUNT".to_string());
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err("INSUFFICIENT_LIQUIDITY".to_string());
    }
    let with_fee = amount_in
        .checked_mul(10_000 - fee_bps)
        .ok_or("MATH_OVERFLOW")?;
    let numerator = with_fee.checked_mul(reserve_out).ok_or("MATH_OVERFLOW")?;
    let denominator = reserve_in
        .checked_mul(10_000)
        .and_then(|d| d.checked_add(with_fee))
        .ok_or("MATH_OVERFLOW")?;
    Ok(numerator / denominator)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockRouter {
    pub address: Address,
    pub fee_bps: u128,
    pools: BTreeMap<PairKey, RouterPool>,
    /// When set, every swap reverts
    #[serde(default)]
    pub failing: bool,
}

impl MockRouter {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            fee_bps: ROUTER_FEE_BPS,
            pools: BTreeMap::new(),
            failing: false,
        }
    }

    pub fn pool(&self, token_x: &Address, token_y: &Address) -> Option<&RouterPool> {
        self.pools.get(&PairKey::of(token_x, token_y))
    }

    pub fn pools(&self) -> impl Iterator<Item = &RouterPool> {
        self.pools.values()
    }

    /// Book liquidity into a pool. The caller is responsible for moving the
    /// tokens to the router's account.
    pub fn add_liquidity(
        &mut self,
        token_x: Address,
        token_y: Address,
        amount_x: u128,
        amount_y: u128,
    ) -> Result<(), String> {
        if token_x == token_y || token_x.is_zero() || token_y.is_zero() {
            return Err("IDENTICAL_OR_ZERO_ADDRESSES".to_string());
        }
        let (token_a, token_b) = sort_tokens(&token_x, &token_y);
        let (amount_a, amount_b) = if token_x == token_a {
            (amount_x, amount_y)
        } else {
            (amount_y, amount_x)
        };
        let pool = self
            .pools
            .entry(PairKey::of(&token_a, &token_b))
            .or_insert(RouterPool {
                token_a,
                token_b,
                reserve_a: 0,
                reserve_b: 0,
            });
        pool.reserve_a = pool.reserve_a.checked_add(amount_a).ok_or("MATH_OVERFLOW")?;
        pool.reserve_b = pool.reserve_b.checked_add(amount_b).ok_or("MATH_OVERFLOW")?;
        Ok(())
    }

    /// Amounts along `path`, first element being `amount_in`.
    pub fn get_amounts_out(&self, amount_in: u128, path: &[Address]) -> Result<Vec<u128>, String> {
        if path.len() < 2 {
            return Err("INVALID_PATH".to_string());
        }
        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);
        for hop in path.windows(2) {
            let pool = self.pool(&hop[0], &hop[1]).ok_or("INSUFFICIENT_LIQUIDITY")?;
            let (reserve_in, reserve_out) = pool.oriented(&hop[0]);
            let prev = amounts[amounts.len() - 1];
            amounts.push(router_amount_out(prev, reserve_in, reserve_out, self.fee_bps)?);
        }
        Ok(amounts)
    }

    /// Validate a `swapExactTokensForTokens` call and update the reserves.
    /// Returns the per-hop amounts; the host settles tokens afterwards.
    pub fn swap_exact_tokens_for_tokens(
        &mut self,
        amount_in: u128,
        amount_out_min: u128,
        path: &[Address],
        deadline: u64,
        now: u64,
    ) -> Result<Vec<u128>, String> {
        if self.failing {
            return Err("ROUTER_DISABLED".to_string());
        }
        if deadline < now {
            return Err("EXPIRED".to_string());
        }
        let amounts = self.get_amounts_out(amount_in, path)?;
        let amount_out = amounts[amounts.len() - 1];
        if amount_out < amount_out_min {
            return Err("INSUFFICIENT_OUTPUT_AMOUNT".to_string());
        }
        for (i, hop) in path.windows(2).enumerate() {
            if let Some(pool) = self.pools.get_mut(&PairKey::of(&hop[0], &hop[1])) {
                pool.apply(&hop[0], amounts[i], amounts[i + 1]);
            }
        }
        Ok(amounts)
    }
}
