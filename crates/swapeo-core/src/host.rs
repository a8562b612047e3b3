//! # Host Interfaces
//!
//! The DEX never touches token balances or the external router directly; it
//! goes through these traits, which the execution environment implements.
//! Every call names its `sender` explicitly (the EVM's `msg.sender`).
//!
//! | Trait        | Solidity counterpart                                        |
//! |--------------|-------------------------------------------------------------|
//! | `TokenHost`  | `IERC20.transfer / transferFrom / approve / balanceOf`      |
//! | `RouterHost` | `IUniswapV2Router02.getAmountsOut / swapExactTokensForTokens` |
//!
//! Failures are plain strings, mirroring a `false` return or a revert
//! reason. The DEX treats any failure as a hard abort of the whole call.

use crate::address::Address;

pub trait TokenHost {
    fn balance_of(&self, token: &Address, account: &Address) -> u128;

    fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> u128;

    /// Move `amount` of `token` from `sender` to `to`.
    fn transfer(
        &mut self,
        token: &Address,
        sender: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), String>;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), String>;

    fn approve(
        &mut self,
        token: &Address,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<(), String>;
}

pub trait RouterHost {
    fn get_amounts_out(
        &self,
        router: &Address,
        amount_in: u128,
        path: &[Address],
    ) -> Result<Vec<u128>, String>;

    #[allow(clippy::too_many_arguments)]
    fn swap_exact_tokens_for_tokens(
        &mut self,
        router: &Address,
        sender: &Address,
        amount_in: u128,
        amount_out_min: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
    ) -> Result<Vec<u128>, String>;
}

/// Everything a DEX entry point may consume from its environment.
pub trait Host: TokenHost + RouterHost {
    /// Block timestamp (seconds). Deterministic for the whole call.
    fn timestamp(&self) -> u64;
}
