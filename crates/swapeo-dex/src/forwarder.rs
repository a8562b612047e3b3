// SPDX-License-Identifier: AGPL-3.0-only
//! # Router Forwarder
//!
//! Explicit fallback for swaps the internal pools cannot serve. One attempt,
//! no retry: pull `amount_in`, keep a flat protocol fee, approve the router
//! for the rest and call `swapExactTokensForTokens` with path
//! `[token_in, token_out]`, the caller as recipient and a bounded deadline.
//! The router is trusted; its own `amount_out_min` check is the only output
//! validation.

use crate::SwapeoDex;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use swapeo_core::{mul_div, Address, DexError, DexEvent, DexResult, Host, BPS_DENOMINATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardReceipt {
    pub amount_in: u128,
    /// Amount handed to the router after the protocol fee
    pub amount_routed: u128,
    pub amount_out: u128,
    pub fee: u128,
}

fn check_forward_tokens(token_in: &Address, token_out: &Address) -> DexResult<()> {
    if token_in.is_zero() || token_out.is_zero() || token_in == token_out {
        return Err(DexError::InvalidTokens);
    }
    Ok(())
}

impl SwapeoDex {
    /// `(fee, net)` split of a forwarded amount.
    pub fn forward_split(&self, amount_in: u128) -> DexResult<(u128, u128)> {
        let fee = mul_div(amount_in, self.config.forward_fee_bps, BPS_DENOMINATOR)?;
        Ok((fee, amount_in - fee))
    }

    /// Router quote for the net-of-fee amount. Read-only.
    pub fn quote_forward<H: Host>(
        &self,
        host: &H,
        token_in: Address,
        token_out: Address,
        amount_in: u128,
    ) -> DexResult<u128> {
        check_forward_tokens(&token_in, &token_out)?;
        let (_, net) = self.forward_split(amount_in)?;
        if net == 0 {
            return Err(DexError::ZeroAmount);
        }
        let amounts = host
            .get_amounts_out(&self.config.router, net, &[token_in, token_out])
            .map_err(DexError::RouterCallFailed)?;
        amounts
            .last()
            .copied()
            .ok_or_else(|| DexError::RouterCallFailed("empty amounts".into()))
    }

    pub fn forward_to_uniswap<H: Host>(
        &mut self,
        host: &mut H,
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: u128,
        min_amount_out: u128,
    ) -> DexResult<ForwardReceipt> {
        self.non_reentrant(|dex| {
            dex.forward_inner(host, caller, token_in, token_out, amount_in, min_amount_out)
        })
    }

    fn forward_inner<H: Host>(
        &mut self,
        host: &mut H,
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: u128,
        min_amount_out: u128,
    ) -> DexResult<ForwardReceipt> {
        check_forward_tokens(&token_in, &token_out)?;
        if amount_in == 0 {
            return Err(DexError::ZeroAmount);
        }
        let (fee, net) = self.forward_split(amount_in)?;
        if net == 0 {
            return Err(DexError::ZeroAmount);
        }
        let accrued = self
            .protocol_fees
            .get(&token_in)
            .copied()
            .unwrap_or(0)
            .checked_add(fee)
            .ok_or(DexError::Overflow)?;
        let deadline = host
            .timestamp()
            .checked_add(self.config.forward_deadline_secs)
            .ok_or(DexError::Overflow)?;

        // Effects
        self.protocol_fees.insert(token_in, accrued);

        // Interactions
        let this = self.address;
        let router = self.config.router;
        host.transfer_from(&token_in, &this, &caller, &this, amount_in)
            .map_err(DexError::TransferFailed)?;
        host.approve(&token_in, &this, &router, net)
            .map_err(DexError::TransferFailed)?;
        debug!(
            "forward {} -> {} net={} fee={} deadline={}",
            token_in, token_out, net, fee, deadline
        );
        let amounts = host
            .swap_exact_tokens_for_tokens(
                &router,
                &this,
                net,
                min_amount_out,
                &[token_in, token_out],
                &caller,
                deadline,
            )
            .map_err(DexError::RouterCallFailed)?;
        let amount_out = amounts
            .last()
            .copied()
            .ok_or_else(|| DexError::RouterCallFailed("empty amounts".into()))?;

        info!(
            "Forwarded: {} sold {} {} via router for {} {}",
            caller, amount_in, token_in, amount_out, token_out
        );
        self.emit(DexEvent::Forwarded {
            user: caller,
            token_in,
            token_out,
            amount_in,
            amount_out,
            fee,
        });

        Ok(ForwardReceipt {
            amount_in,
            amount_routed: net,
            amount_out,
            fee,
        })
    }
}
