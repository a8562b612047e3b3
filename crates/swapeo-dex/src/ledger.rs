// SPDX-License-Identifier: AGPL-3.0-only
//! # Liquidity Ledger
//!
//! Per-pair LP positions, held as per-token claim units, plus the list of
//! active providers used by fee distribution.
//!
//! Units equal deposited amounts until swaps move the reserves away from the
//! unit totals. From then on a unit redeems `reserve / total_units` tokens.
//! Both minting and redemption round down, so rounding stays with the pool.

use crate::pair::{resolve_mutable_pair_key, Side};
use crate::SwapeoDex;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use swapeo_core::address::sort_tokens;
use swapeo_core::{mul_div, Address, DexError, DexEvent, DexResult, Host, PairKey};

// ─────────────────────────────────────────────────────────────
// LP REGISTRY
// ─────────────────────────────────────────────────────────────

/// Distinct provider list with O(1) membership removal (swap-with-last-and-pop).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LpRegistry {
    providers: Vec<Address>,
    index: BTreeMap<Address, usize>,
}

impl LpRegistry {
    /// Returns `false` if the provider was already registered.
    pub fn insert(&mut self, provider: Address) -> bool {
        if self.index.contains_key(&provider) {
            return false;
        }
        self.index.insert(provider, self.providers.len());
        self.providers.push(provider);
        true
    }

    pub fn remove(&mut self, provider: &Address) -> bool {
        let Some(idx) = self.index.remove(provider) else {
            return false;
        };
        self.providers.swap_remove(idx);
        if let Some(moved) = self.providers.get(idx) {
            self.index.insert(*moved, idx);
        }
        true
    }

    pub fn contains(&self, provider: &Address) -> bool {
        self.index.contains_key(provider)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.providers
    }
}

// ─────────────────────────────────────────────────────────────
// POSITIONS
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpPosition {
    pub units_a: u128,
    pub units_b: u128,
}

impl LpPosition {
    pub fn units(&self, side: Side) -> u128 {
        match side {
            Side::A => self.units_a,
            Side::B => self.units_b,
        }
    }

    fn set_units(&mut self, side: Side, value: u128) {
        match side {
            Side::A => self.units_a = value,
            Side::B => self.units_b = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.units_a == 0 && self.units_b == 0
    }
}

/// LP book for a single pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairLedger {
    pub(crate) positions: BTreeMap<Address, LpPosition>,
    pub(crate) providers: LpRegistry,
    pub(crate) total_units_a: u128,
    pub(crate) total_units_b: u128,
}

impl PairLedger {
    pub fn position(&self, provider: &Address) -> LpPosition {
        self.positions.get(provider).copied().unwrap_or_default()
    }

    pub fn total_units(&self, side: Side) -> u128 {
        match side {
            Side::A => self.total_units_a,
            Side::B => self.total_units_b,
        }
    }

    fn set_total_units(&mut self, side: Side, value: u128) {
        match side {
            Side::A => self.total_units_a = value,
            Side::B => self.total_units_b = value,
        }
    }

    pub fn providers(&self) -> &[Address] {
        self.providers.as_slice()
    }

    /// Add `units` to a provider, registering them if new.
    pub(crate) fn credit(&mut self, provider: Address, side: Side, units: u128) -> DexResult<()> {
        let mut position = self.position(&provider);
        let new_units = position
            .units(side)
            .checked_add(units)
            .ok_or(DexError::Overflow)?;
        let new_total = self
            .total_units(side)
            .checked_add(units)
            .ok_or(DexError::Overflow)?;
        position.set_units(side, new_units);
        self.set_total_units(side, new_total);
        self.positions.insert(provider, position);
        self.providers.insert(provider);
        Ok(())
    }

    /// Remove `units` from a provider. Drops them from the active list once
    /// both sides reach zero.
    pub(crate) fn debit(&mut self, provider: &Address, side: Side, units: u128) -> DexResult<()> {
        let mut position = self.position(provider);
        let have = position.units(side);
        if have < units {
            return Err(DexError::InsufficientBalance { have, need: units });
        }
        position.set_units(side, have - units);
        let total = self.total_units(side);
        self.set_total_units(side, total.checked_sub(units).ok_or(DexError::Overflow)?);
        if position.is_empty() {
            self.positions.remove(provider);
            self.providers.remove(provider);
        } else {
            self.positions.insert(*provider, position);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiquidityLedger {
    pairs: BTreeMap<PairKey, PairLedger>,
}

impl LiquidityLedger {
    pub fn get(&self, key: &PairKey) -> Option<&PairLedger> {
        self.pairs.get(key)
    }

    pub(crate) fn entry(&mut self, key: PairKey) -> &mut PairLedger {
        self.pairs.entry(key).or_default()
    }
}

// ─────────────────────────────────────────────────────────────
// UNIT MATH
// ─────────────────────────────────────────────────────────────

/// Units minted for depositing `amount` into a side holding `reserve`
/// against `total_units` outstanding. First liquidity mints 1:1.
pub fn units_for_deposit(amount: u128, reserve: u128, total_units: u128) -> DexResult<u128> {
    if total_units == 0 || reserve == 0 {
        return Ok(amount);
    }
    mul_div(amount, total_units, reserve)
}

/// Tokens paid out for redeeming `units` from a side. The last provider out
/// (`units == total_units`) receives the whole reserve.
pub fn amount_for_units(units: u128, reserve: u128, total_units: u128) -> DexResult<u128> {
    if total_units == 0 {
        return Ok(0);
    }
    if units == total_units {
        return Ok(reserve);
    }
    mul_div(units, reserve, total_units)
}

// ─────────────────────────────────────────────────────────────
// ENTRY POINTS
// ─────────────────────────────────────────────────────────────

/// Result of a successful deposit, in canonical pair order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub pair_key: PairKey,
    pub units_a: u128,
    pub units_b: u128,
}

/// Result of a successful withdrawal, in canonical pair order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub pair_key: PairKey,
    pub units_a: u128,
    pub units_b: u128,
    pub amount_a: u128,
    pub amount_b: u128,
}

impl SwapeoDex {
    /// Add liquidity. Creates the pair on first deposit.
    /// Pulls both amounts from `caller`, who must have approved the DEX.
    pub fn deposit<H: Host>(
        &mut self,
        host: &mut H,
        caller: Address,
        token_x: Address,
        token_y: Address,
        amount_x: u128,
        amount_y: u128,
    ) -> DexResult<DepositReceipt> {
        self.non_reentrant(|dex| {
            dex.deposit_inner(host, caller, token_x, token_y, amount_x, amount_y)
        })
    }

    fn deposit_inner<H: Host>(
        &mut self,
        host: &mut H,
        caller: Address,
        token_x: Address,
        token_y: Address,
        amount_x: u128,
        amount_y: u128,
    ) -> DexResult<DepositReceipt> {
        let key = resolve_mutable_pair_key(&token_x, &token_y)?;
        if amount_x == 0 || amount_y == 0 {
            return Err(DexError::ZeroAmount);
        }

        let (token_a, token_b) = sort_tokens(&token_x, &token_y);
        let (amount_a, amount_b) = if token_x == token_a {
            (amount_x, amount_y)
        } else {
            (amount_y, amount_x)
        };

        let mut pair = self.pairs.get_by_tokens(&token_a, &token_b);
        let book = self.ledger.get(&key).cloned().unwrap_or_default();

        // Checks: all arithmetic before any write
        let units_a = units_for_deposit(amount_a, pair.reserve_a, book.total_units_a)?;
        let units_b = units_for_deposit(amount_b, pair.reserve_b, book.total_units_b)?;
        if units_a == 0 || units_b == 0 {
            return Err(DexError::ZeroAmount);
        }
        let reserve_a = pair.reserve_a.checked_add(amount_a).ok_or(DexError::Overflow)?;
        let reserve_b = pair.reserve_b.checked_add(amount_b).ok_or(DexError::Overflow)?;

        // Effects
        let mut book = book;
        book.credit(caller, Side::A, units_a)?;
        book.credit(caller, Side::B, units_b)?;
        *self.ledger.entry(key) = book;
        pair.reserve_a = reserve_a;
        pair.reserve_b = reserve_b;
        self.pairs.store(key, pair);

        debug!(
            "deposit {} units=({}, {}) reserves=({}, {})",
            key, units_a, units_b, reserve_a, reserve_b
        );

        // Interactions
        let this = self.address;
        host.transfer_from(&token_a, &this, &caller, &this, amount_a)
            .map_err(DexError::TransferFailed)?;
        host.transfer_from(&token_b, &this, &caller, &this, amount_b)
            .map_err(DexError::TransferFailed)?;

        info!(
            "Deposit: {} added {} / {} to {}",
            caller, amount_a, amount_b, key
        );
        self.emit(DexEvent::Deposit {
            provider: caller,
            token_a,
            token_b,
            amount_a,
            amount_b,
        });

        Ok(DepositReceipt {
            pair_key: key,
            units_a,
            units_b,
        })
    }

    /// Remove liquidity. `amount` is in units of `token_x` (the primary
    /// token); the `token_y` units withdrawn alongside are pro-rata to the
    /// caller's own recorded ratio.
    pub fn withdraw<H: Host>(
        &mut self,
        host: &mut H,
        caller: Address,
        token_x: Address,
        token_y: Address,
        amount: u128,
    ) -> DexResult<WithdrawReceipt> {
        self.non_reentrant(|dex| dex.withdraw_inner(host, caller, token_x, token_y, amount))
    }

    fn withdraw_inner<H: Host>(
        &mut self,
        host: &mut H,
        caller: Address,
        token_x: Address,
        token_y: Address,
        amount: u128,
    ) -> DexResult<WithdrawReceipt> {
        let key = resolve_mutable_pair_key(&token_x, &token_y)?;
        if amount == 0 {
            return Err(DexError::ZeroAmount);
        }
        if !self.pairs.contains(&key) {
            return Err(DexError::PairNotFound);
        }

        let mut pair = self.pairs.get(&key);
        let mut book = self.ledger.get(&key).cloned().unwrap_or_default();
        let primary = pair.side_of(&token_x).ok_or(DexError::InvalidTokens)?;
        let secondary = primary.other();

        let position = book.position(&caller);
        let have = position.units(primary);
        if have < amount {
            return Err(DexError::InsufficientBalance { have, need: amount });
        }
        let counterpart = mul_div(amount, position.units(secondary), have)?;

        let out_primary = amount_for_units(
            amount,
            pair.reserve(primary),
            book.total_units(primary),
        )?;
        let out_secondary = amount_for_units(
            counterpart,
            pair.reserve(secondary),
            book.total_units(secondary),
        )?;

        // Effects
        book.debit(&caller, primary, amount)?;
        if counterpart > 0 {
            book.debit(&caller, secondary, counterpart)?;
        }
        pair.set_reserve(primary, pair.reserve(primary) - out_primary);
        pair.set_reserve(secondary, pair.reserve(secondary) - out_secondary);
        *self.ledger.entry(key) = book;
        let (token_a, token_b) = (pair.token_a, pair.token_b);
        self.pairs.store(key, pair);

        let (units_a, units_b, amount_a, amount_b) = match primary {
            Side::A => (amount, counterpart, out_primary, out_secondary),
            Side::B => (counterpart, amount, out_secondary, out_primary),
        };
        debug!(
            "withdraw {} units=({}, {}) paid=({}, {})",
            key, units_a, units_b, amount_a, amount_b
        );

        // Interactions
        let this = self.address;
        if amount_a > 0 {
            host.transfer(&token_a, &this, &caller, amount_a)
                .map_err(DexError::TransferFailed)?;
        }
        if amount_b > 0 {
            host.transfer(&token_b, &this, &caller, amount_b)
                .map_err(DexError::TransferFailed)?;
        }

        info!(
            "Withdraw: {} removed {} / {} from {}",
            caller, amount_a, amount_b, key
        );
        self.emit(DexEvent::Withdraw {
            provider: caller,
            token_a,
            token_b,
            amount_a,
            amount_b,
        });

        Ok(WithdrawReceipt {
            pair_key: key,
            units_a,
            units_b,
            amount_a,
            amount_b,
        })
    }
}
