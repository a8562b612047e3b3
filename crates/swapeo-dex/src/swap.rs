// SPDX-License-Identifier: AGPL-3.0-only
//! # Swap Engine
//!
//! Constant product with fee extraction:
//!
//! ```text
//! fee          = amount_in * fee_bps / 10_000        (1% by default)
//! amount_net   = amount_in - fee
//! amount_out   = amount_net * reserve_out / (reserve_in + amount_net)
//! reserve_in  += amount_net      reserve_out -= amount_out
//! ```
//!
//! The fee never enters the reserves; it accrues to the pair's fee
//! accumulator for the input token until the owner distributes it.

use crate::pair::{resolve_mutable_pair_key, resolve_pair_key};
use crate::SwapeoDex;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use swapeo_core::{
    mul_div, u128_str, Address, DexError, DexEvent, DexResult, Host, BPS_DENOMINATOR,
    PRICE_PRECISION,
};

// ─────────────────────────────────────────────────────────────
// INTEGER MATH (NO f32/f64)
// ─────────────────────────────────────────────────────────────

/// Fee taken from `amount_in`. Truncates: 1 unit in at 1% pays no fee.
pub fn compute_fee(amount_in: u128, fee_bps: u128) -> DexResult<u128> {
    mul_div(amount_in, fee_bps, BPS_DENOMINATOR)
}

/// Constant-product output for an input already net of fees.
/// Strictly less than `reserve_out` whenever `reserve_in > 0`.
pub fn compute_output(amount_net: u128, reserve_in: u128, reserve_out: u128) -> DexResult<u128> {
    if reserve_in == 0 || reserve_out == 0 || amount_net == 0 {
        return Ok(0);
    }
    let denominator = reserve_in.checked_add(amount_net).ok_or(DexError::Overflow)?;
    mul_div(amount_net, reserve_out, denominator)
}

/// Fee split and output for a swap against the given reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapAmounts {
    pub fee: u128,
    pub amount_net: u128,
    pub amount_out: u128,
}

pub fn compute_swap(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
    fee_bps: u128,
) -> DexResult<SwapAmounts> {
    let fee = compute_fee(amount_in, fee_bps)?;
    let amount_net = amount_in - fee;
    let amount_out = compute_output(amount_net, reserve_in, reserve_out)?;
    Ok(SwapAmounts {
        fee,
        amount_net,
        amount_out,
    })
}

/// Reject outputs that would empty the pool or take more than
/// `max_output_bps` of it in one call.
pub fn check_output(amount_out: u128, reserve_out: u128, max_output_bps: u128) -> DexResult<()> {
    let invalid = DexError::InvalidOutput {
        amount_out,
        reserve_out,
    };
    if amount_out == 0 || amount_out >= reserve_out {
        return Err(invalid);
    }
    let scaled_out = amount_out.checked_mul(BPS_DENOMINATOR).ok_or(DexError::Overflow)?;
    let bound = reserve_out.checked_mul(max_output_bps).ok_or(DexError::Overflow)?;
    if scaled_out > bound {
        return Err(invalid);
    }
    Ok(())
}

/// Read-only quote with price impact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    #[serde(with = "u128_str")]
    pub amount_out: u128,
    #[serde(with = "u128_str")]
    pub fee: u128,
    #[serde(with = "u128_str")]
    pub price_impact_bps: u128,
    /// `reserve_out / reserve_in` scaled by 10^12
    #[serde(with = "u128_str")]
    pub spot_price_scaled: u128,
}

/// Result of an executed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub amount_in: u128,
    pub amount_out: u128,
    pub fee: u128,
}

impl SwapeoDex {
    /// Reserves oriented as `(reserve_in, reserve_out)`. Fails unless the
    /// pair exists with both reserves non-zero.
    fn oriented_reserves(&self, token_in: &Address, token_out: &Address) -> DexResult<(u128, u128)> {
        let key = resolve_pair_key(token_in, token_out)?;
        let pair = self.pairs.get(&key);
        if !pair.is_liquid() {
            return Err(DexError::PairNotFoundOrEmpty);
        }
        let side_in = pair.side_of(token_in).ok_or(DexError::InvalidTokens)?;
        Ok((pair.reserve(side_in), pair.reserve(side_in.other())))
    }

    /// Constant-product output for `amount_in` of `token_in`, fee included.
    pub fn get_amount_out(
        &self,
        token_in: &Address,
        token_out: &Address,
        amount_in: u128,
    ) -> DexResult<u128> {
        let (reserve_in, reserve_out) = self.oriented_reserves(token_in, token_out)?;
        Ok(compute_swap(amount_in, reserve_in, reserve_out, self.config.swap_fee_bps)?.amount_out)
    }

    pub fn quote(&self, token_in: &Address, token_out: &Address, amount_in: u128) -> DexResult<Quote> {
        let (reserve_in, reserve_out) = self.oriented_reserves(token_in, token_out)?;
        let amounts = compute_swap(amount_in, reserve_in, reserve_out, self.config.swap_fee_bps)?;

        let spot_price_scaled = mul_div(reserve_out, PRICE_PRECISION, reserve_in)?;
        let exec_price_scaled = if amount_in > 0 {
            mul_div(amounts.amount_out, PRICE_PRECISION, amount_in)?
        } else {
            0
        };
        let price_impact_bps = if spot_price_scaled > exec_price_scaled {
            mul_div(
                spot_price_scaled - exec_price_scaled,
                BPS_DENOMINATOR,
                spot_price_scaled,
            )?
        } else {
            0
        };

        Ok(Quote {
            amount_out: amounts.amount_out,
            fee: amounts.fee,
            price_impact_bps,
            spot_price_scaled,
        })
    }

    /// Swap against internal liquidity. Never forwards on its own: a missing
    /// or empty pair fails with `PairNotFoundOrEmpty` and the caller decides
    /// whether to use `forward_to_uniswap`.
    /// `min_amount_out == 0` disables the slippage check.
    pub fn swap<H: Host>(
        &mut self,
        host: &mut H,
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: u128,
        min_amount_out: u128,
    ) -> DexResult<SwapReceipt> {
        self.non_reentrant(|dex| {
            dex.swap_inner(host, caller, token_in, token_out, amount_in, min_amount_out)
        })
    }

    fn swap_inner<H: Host>(
        &mut self,
        host: &mut H,
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: u128,
        min_amount_out: u128,
    ) -> DexResult<SwapReceipt> {
        let key = resolve_mutable_pair_key(&token_in, &token_out)?;
        if amount_in == 0 {
            return Err(DexError::ZeroAmount);
        }

        let mut pair = self.pairs.get(&key);
        if !pair.is_liquid() {
            return Err(DexError::PairNotFoundOrEmpty);
        }
        let side_in = pair.side_of(&token_in).ok_or(DexError::InvalidTokens)?;
        let side_out = side_in.other();
        let reserve_in = pair.reserve(side_in);
        let reserve_out = pair.reserve(side_out);

        let amounts = compute_swap(amount_in, reserve_in, reserve_out, self.config.swap_fee_bps)?;
        check_output(amounts.amount_out, reserve_out, self.config.max_output_bps)?;
        if amounts.amount_out < min_amount_out {
            return Err(DexError::SlippageExceeded {
                amount_out: amounts.amount_out,
                min_amount_out,
            });
        }

        let new_reserve_in = reserve_in
            .checked_add(amounts.amount_net)
            .ok_or(DexError::Overflow)?;
        let mut fees = self.fees.get(&key);
        let new_collected = fees
            .collected(side_in)
            .checked_add(amounts.fee)
            .ok_or(DexError::Overflow)?;

        // Effects
        pair.set_reserve(side_in, new_reserve_in);
        pair.set_reserve(side_out, reserve_out - amounts.amount_out);
        self.pairs.store(key, pair);
        fees.set_collected(side_in, new_collected);
        self.fees.store(key, fees);

        debug!(
            "swap {} in={} fee={} net={} out={}",
            key, amount_in, amounts.fee, amounts.amount_net, amounts.amount_out
        );

        // Interactions
        let this = self.address;
        host.transfer_from(&token_in, &this, &caller, &this, amount_in)
            .map_err(DexError::TransferFailed)?;
        host.transfer(&token_out, &this, &caller, amounts.amount_out)
            .map_err(DexError::TransferFailed)?;

        info!(
            "Swap: {} sold {} {} for {} {}",
            caller, amount_in, token_in, amounts.amount_out, token_out
        );
        self.emit(DexEvent::Swap {
            user: caller,
            token_in,
            token_out,
            amount_in,
            amount_out: amounts.amount_out,
            fee: amounts.fee,
        });

        Ok(SwapReceipt {
            amount_in,
            amount_out: amounts.amount_out,
            fee: amounts.fee,
        })
    }
}
