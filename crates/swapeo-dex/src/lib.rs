// SPDX-License-Identifier: AGPL-3.0-only
//! # Swapeo DEX Contract
//!
//! Constant-product AMM (x·y=k) over canonical token pairs, with a 1% swap
//! fee accrued per pair and per input token, owner-triggered fee
//! distribution to liquidity providers, and an explicit fallback that
//! forwards a swap to an external Uniswap-V2-compatible router.
//!
//! ## State Layout
//! - `pairs`          → `PairKey → Pair { token_a, token_b, reserve_a, reserve_b, exists }`
//! - `ledger`         → `PairKey → { Address → (units_a, units_b) }` plus active LP list
//! - `fees`           → `PairKey → (collected_a, collected_b)`
//! - `protocol_fees`  → `Address → u128` retained from forwarded swaps
//!
//! ## Entry Points
//! | Function              | Args                                                    |
//! |-----------------------|---------------------------------------------------------|
//! | `deposit`             | token_x, token_y, amount_x, amount_y                    |
//! | `withdraw`            | token_x, token_y, amount (units of token_x)             |
//! | `swap`                | token_in, token_out, amount_in, min_amount_out          |
//! | `distribute_fees`     | token_x, token_y, fee_token (owner only)                |
//! | `forward_to_uniswap`  | token_in, token_out, amount_in, min_amount_out          |
//! | `get_pair`            | token_x, token_y                                        |
//! | `get_amount_out`      | token_in, token_out, amount_in                          |
//! | `lp_balance`          | token_x, token_y, token, provider                       |
//! | `lp_providers`        | token_x, token_y                                        |
//! | `fees_collected`      | token_x, token_y, token                                 |
//!
//! Every mutating entry point runs under a non-reentrant guard and follows
//! checks → effects → interactions. Any error aborts the call; the
//! execution environment is expected to discard partial effects.

pub mod fees;
pub mod forwarder;
pub mod ledger;
pub mod pair;
pub mod registry;
pub mod swap;

pub use fees::{Distribution, FeeAccumulator, FeeBook};
pub use forwarder::ForwardReceipt;
pub use ledger::{
    amount_for_units, units_for_deposit, DepositReceipt, LiquidityLedger, LpPosition, LpRegistry,
    PairLedger, WithdrawReceipt,
};
pub use pair::{resolve_mutable_pair_key, resolve_pair_key, Pair, PairRegistry, PairState, Side};
pub use registry::{PoolInfo, Position};
pub use swap::{check_output, compute_fee, compute_output, compute_swap, Quote, SwapAmounts, SwapReceipt};

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use swapeo_core::{Address, DexConfig, DexError, DexEvent, DexResult};

/// The DEX contract state. Cloneable so the host can snapshot it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapeoDex {
    /// The contract's own account: holds reserves and pending fees
    pub(crate) address: Address,
    pub(crate) config: DexConfig,
    pub(crate) pairs: PairRegistry,
    pub(crate) ledger: LiquidityLedger,
    pub(crate) fees: FeeBook,
    pub(crate) protocol_fees: BTreeMap<Address, u128>,
    #[serde(skip)]
    locked: bool,
    #[serde(skip)]
    events: Vec<DexEvent>,
}

impl SwapeoDex {
    pub fn new(address: Address, config: DexConfig) -> DexResult<Self> {
        if address.is_zero() {
            return Err(DexError::InvalidConfig(
                "contract address cannot be zero".into(),
            ));
        }
        config.validate()?;
        Ok(Self {
            address,
            config,
            pairs: PairRegistry::new(),
            ledger: LiquidityLedger::default(),
            fees: FeeBook::default(),
            protocol_fees: BTreeMap::new(),
            locked: false,
            events: Vec::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &DexConfig {
        &self.config
    }

    pub fn owner(&self) -> Address {
        self.config.owner
    }

    /// Run `f` with the reentrancy lock held. The lock is released on both
    /// success and error.
    pub(crate) fn non_reentrant<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> DexResult<T>,
    ) -> DexResult<T> {
        if self.locked {
            warn!("reentrant call into {} rejected", self.address);
            return Err(DexError::Reentrancy);
        }
        self.locked = true;
        let result = f(self);
        self.locked = false;
        result
    }

    pub(crate) fn emit(&mut self, event: DexEvent) {
        self.events.push(event);
    }

    /// Drain events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<DexEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[DexEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dex() -> SwapeoDex {
        let config = DexConfig::new(Address::derive("owner"), Address::derive("router"));
        SwapeoDex::new(Address::derive("swapeo"), config).unwrap()
    }

    #[test]
    fn test_new_validates_config() {
        let mut config = DexConfig::new(Address::derive("owner"), Address::derive("router"));
        config.swap_fee_bps = 5_000;
        assert!(matches!(
            SwapeoDex::new(Address::derive("swapeo"), config),
            Err(DexError::InvalidConfig(_))
        ));

        let config = DexConfig::new(Address::derive("owner"), Address::derive("router"));
        assert!(SwapeoDex::new(Address::ZERO, config).is_err());
    }

    #[test]
    fn test_reentrant_call_rejected() {
        let mut dex = dex();
        let owner = dex.owner();
        let (x, y) = (Address::derive("TKA"), Address::derive("TKB"));

        // A call arriving while another entry point is in flight
        let err = dex
            .non_reentrant(|inner| inner.distribute_fees(owner, x, y, x))
            .unwrap_err();
        assert_eq!(err, DexError::Reentrancy);

        // Lock released afterwards: the ordinary error path is reachable again
        assert_eq!(
            dex.distribute_fees(owner, x, y, x).unwrap_err(),
            DexError::PairNotFound
        );
    }

    #[test]
    fn test_lock_released_on_error() {
        let mut dex = dex();
        let r: DexResult<()> = dex.non_reentrant(|_| Err(DexError::ZeroAmount));
        assert_eq!(r, Err(DexError::ZeroAmount));
        assert!(!dex.locked);
    }

    #[test]
    fn test_state_json_roundtrip_skips_transient_fields() {
        let mut dex = dex();
        dex.emit(DexEvent::FeesDistributed {
            pair_key: swapeo_core::PairKey::of(&Address::derive("a"), &Address::derive("b")),
            token: Address::derive("a"),
            total_fees: 1,
        });
        let json = serde_json::to_string(&dex).unwrap();
        let restored: SwapeoDex = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.address(), dex.address());
        assert_eq!(restored.config(), dex.config());
        assert!(restored.pending_events().is_empty());
    }
}
