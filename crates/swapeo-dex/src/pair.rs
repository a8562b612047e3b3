// SPDX-License-Identifier: AGPL-3.0-only
//! # Pair Registry
//!
//! Canonicalizes `(token_x, token_y)` into an order-independent [`PairKey`]
//! and owns the reserve record for each pair. Pairs are created on first
//! deposit and never deleted; a drained pair keeps `exists = true`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use swapeo_core::address::sort_tokens;
use swapeo_core::{Address, DexError, DexResult, PairKey};

/// Which half of a canonical pair a token occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Lifecycle of a pair. `Drained` and `NonExistent` both refuse swaps but
/// only `Drained` pairs accept withdrawals of leftover positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairState {
    NonExistent,
    Active,
    Drained,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// Lower address of the two
    pub token_a: Address,
    pub token_b: Address,
    pub reserve_a: u128,
    pub reserve_b: u128,
    /// Set on first deposit, never cleared
    pub exists: bool,
}

impl Pair {
    fn empty(token_a: Address, token_b: Address) -> Self {
        Self {
            token_a,
            token_b,
            reserve_a: 0,
            reserve_b: 0,
            exists: false,
        }
    }

    pub fn side_of(&self, token: &Address) -> Option<Side> {
        if *token == self.token_a {
            Some(Side::A)
        } else if *token == self.token_b {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn token(&self, side: Side) -> Address {
        match side {
            Side::A => self.token_a,
            Side::B => self.token_b,
        }
    }

    pub fn reserve(&self, side: Side) -> u128 {
        match side {
            Side::A => self.reserve_a,
            Side::B => self.reserve_b,
        }
    }

    pub(crate) fn set_reserve(&mut self, side: Side, value: u128) {
        match side {
            Side::A => self.reserve_a = value,
            Side::B => self.reserve_b = value,
        }
    }

    pub fn state(&self) -> PairState {
        if !self.exists {
            PairState::NonExistent
        } else if self.reserve_a == 0 || self.reserve_b == 0 {
            PairState::Drained
        } else {
            PairState::Active
        }
    }

    /// Both reserves non-zero: the pool can quote a swap.
    pub fn is_liquid(&self) -> bool {
        self.state() == PairState::Active
    }
}

// ─────────────────────────────────────────────────────────────
// KEY RESOLUTION
// ─────────────────────────────────────────────────────────────

/// Key for read-only lookups. Identical tokens are allowed here.
pub fn resolve_pair_key(token_x: &Address, token_y: &Address) -> DexResult<PairKey> {
    if token_x.is_zero() || token_y.is_zero() {
        return Err(DexError::InvalidTokens);
    }
    Ok(PairKey::of(token_x, token_y))
}

/// Key for state-mutating calls: a self-pair is meaningless for swapping.
pub fn resolve_mutable_pair_key(token_x: &Address, token_y: &Address) -> DexResult<PairKey> {
    if token_x == token_y {
        return Err(DexError::InvalidTokens);
    }
    resolve_pair_key(token_x, token_y)
}

// ─────────────────────────────────────────────────────────────
// REGISTRY
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairRegistry {
    pairs: BTreeMap<PairKey, Pair>,
    /// Creation order, for enumeration
    order: Vec<PairKey>,
}

impl PairRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve record for `key`. Unknown keys yield a zeroed, non-existent pair.
    pub fn get(&self, key: &PairKey) -> Pair {
        self.pairs.get(key).cloned().unwrap_or_default()
    }

    /// Reserve record for a token pair, carrying canonical tokens even when
    /// the pair has never been created.
    pub fn get_by_tokens(&self, token_x: &Address, token_y: &Address) -> Pair {
        let key = PairKey::of(token_x, token_y);
        match self.pairs.get(&key) {
            Some(pair) => pair.clone(),
            None => {
                let (a, b) = sort_tokens(token_x, token_y);
                Pair::empty(a, b)
            }
        }
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.pairs.get(key).map(|p| p.exists).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &Pair)> {
        self.order
            .iter()
            .filter_map(move |key| self.pairs.get(key).map(|pair| (key, pair)))
    }

    /// Write back a pair record, registering it on first store.
    pub(crate) fn store(&mut self, key: PairKey, mut pair: Pair) {
        pair.exists = true;
        if !self.pairs.contains_key(&key) {
            self.order.push(key);
        }
        self.pairs.insert(key, pair);
    }
}
