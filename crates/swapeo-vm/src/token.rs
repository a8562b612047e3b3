// SPDX-License-Identifier: AGPL-3.0-only
//! # Reference ERC-20 Token
//!
//! In-process fungible token used by the devnet and the test suites as the
//! counterpart of every `TokenHost` call the DEX makes.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Erc20Token                                          │
//! │  ┌──────────┐  ┌───────────┐  ┌───────────────────┐  │
//! │  │ Metadata │  │ Balances  │  │ Allowances        │  │
//! │  │ name     │  │ addr→u128 │  │ owner→spender→u128│  │
//! │  │ symbol   │  │           │  │                   │  │
//! │  │ decimals │  │           │  │                   │  │
//! │  │ supply   │  │           │  │                   │  │
//! │  └──────────┘  └───────────┘  └───────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Failed operations leave the token untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use swapeo_core::{u128_str, Address};

// ─────────────────────────────────────────────────────────────
// TOKEN METADATA
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenMetadata {
    /// Human-readable name (e.g. "Wrapped Ether")
    pub name: String,
    /// Ticker symbol, max 8 characters
    pub symbol: String,
    pub decimals: u8,
    #[serde(with = "u128_str")]
    pub total_supply: u128,
}

impl TokenMetadata {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.name.len() > 64 {
            return Err("Name must be 1-64 characters".to_string());
        }
        if self.symbol.is_empty() || self.symbol.len() > 8 {
            return Err("Symbol must be 1-8 characters".to_string());
        }
        if self.decimals > 18 {
            return Err("Decimals must be 0-18".to_string());
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// ACTIONS & EVENTS
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum TokenAction {
    Transfer {
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    Approve {
        spender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    TransferFrom {
        from: Address,
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    /// Issuer only
    Mint {
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    Burn {
        #[serde(with = "u128_str")]
        amount: u128,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum TokenEvent {
    /// Mints come `from` the zero address, burns go `to` it.
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub events: Vec<TokenEvent>,
}

impl TokenResponse {
    fn from_result(result: Result<TokenEvent, String>) -> Self {
        match result {
            Ok(event) => Self {
                success: true,
                message: "ok".to_string(),
                events: vec![event],
            },
            Err(message) => Self {
                success: false,
                message,
                events: Vec::new(),
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────
// REFERENCE IMPLEMENTATION
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Erc20Token {
    pub address: Address,
    pub metadata: TokenMetadata,
    /// Account allowed to mint
    pub issuer: Address,
    pub balances: BTreeMap<Address, u128>,
    /// owner → spender → allowance
    pub allowances: BTreeMap<Address, BTreeMap<Address, u128>>,
}

impl Erc20Token {
    /// New token with `initial_supply` credited to `issuer`.
    pub fn new(
        address: Address,
        name: String,
        symbol: String,
        decimals: u8,
        initial_supply: u128,
        issuer: Address,
    ) -> Result<Self, String> {
        if address.is_zero() || issuer.is_zero() {
            return Err("Token and issuer addresses must be non-zero".to_string());
        }
        let metadata = TokenMetadata {
            name,
            symbol,
            decimals,
            total_supply: initial_supply,
        };
        metadata.validate()?;

        let mut balances = BTreeMap::new();
        if initial_supply > 0 {
            balances.insert(issuer, initial_supply);
        }
        Ok(Self {
            address,
            metadata,
            issuer,
            balances,
            allowances: BTreeMap::new(),
        })
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.metadata.total_supply
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), String> {
        if to.is_zero() {
            return Err("Transfer to the zero address".to_string());
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(format!(
                "Insufficient balance: {} has {} need {}",
                from, from_balance, amount
            ));
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or("Balance overflow")?;
        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance);
        Ok(())
    }

    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<TokenEvent, String> {
        self.move_balance(caller, to, amount)?;
        Ok(TokenEvent::Transfer {
            from: *caller,
            to: *to,
            amount,
        })
    }

    /// Overwrites any previous allowance.
    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: u128) -> Result<TokenEvent, String> {
        if spender.is_zero() {
            return Err("Approve to the zero address".to_string());
        }
        self.allowances
            .entry(*caller)
            .or_default()
            .insert(*spender, amount);
        Ok(TokenEvent::Approval {
            owner: *caller,
            spender: *spender,
            amount,
        })
    }

    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TokenEvent, String> {
        let allowance = self.allowance(from, caller);
        if allowance < amount {
            return Err(format!(
                "Allowance exceeded: have {} need {}",
                allowance, amount
            ));
        }
        self.move_balance(from, to, amount)?;
        self.allowances
            .entry(*from)
            .or_default()
            .insert(*caller, allowance - amount);
        Ok(TokenEvent::Transfer {
            from: *from,
            to: *to,
            amount,
        })
    }

    pub fn mint(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<TokenEvent, String> {
        if *caller != self.issuer {
            return Err(format!("Only the issuer {} can mint", self.issuer));
        }
        if to.is_zero() {
            return Err("Mint to the zero address".to_string());
        }
        let supply = self
            .metadata
            .total_supply
            .checked_add(amount)
            .ok_or("Supply overflow")?;
        let balance = self.balance_of(to).checked_add(amount).ok_or("Balance overflow")?;
        self.metadata.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(TokenEvent::Transfer {
            from: Address::ZERO,
            to: *to,
            amount,
        })
    }

    pub fn burn(&mut self, caller: &Address, amount: u128) -> Result<TokenEvent, String> {
        let balance = self.balance_of(caller);
        if balance < amount {
            return Err(format!("Insufficient balance: have {} need {}", balance, amount));
        }
        self.balances.insert(*caller, balance - amount);
        self.metadata.total_supply -= amount;
        Ok(TokenEvent::Transfer {
            from: *caller,
            to: Address::ZERO,
            amount,
        })
    }

    /// Dispatch a serialized action on behalf of `caller`.
    pub fn execute(&mut self, caller: &Address, action: TokenAction) -> TokenResponse {
        let result = match action {
            TokenAction::Transfer { to, amount } => self.transfer(caller, &to, amount),
            TokenAction::Approve { spender, amount } => self.approve(caller, &spender, amount),
            TokenAction::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, &from, &to, amount)
            }
            TokenAction::Mint { to, amount } => self.mint(caller, &to, amount),
            TokenAction::Burn { amount } => self.burn(caller, amount),
        };
        TokenResponse::from_result(result)
    }

    /// Sum of all balances equals total supply.
    pub fn is_consistent(&self) -> bool {
        let sum: Option<u128> = self
            .balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b));
        sum == Some(self.metadata.total_supply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> (Erc20Token, Address) {
        let issuer = Address::derive("issuer");
        let token = Erc20Token::new(
            Address::derive("token:TKA"),
            "Token A".to_string(),
            "TKA".to_string(),
            18,
            1_000_000,
            issuer,
        )
        .unwrap();
        (token, issuer)
    }

    #[test]
    fn test_new_token_credits_issuer() {
        let (token, issuer) = token();
        assert_eq!(token.balance_of(&issuer), 1_000_000);
        assert_eq!(token.total_supply(), 1_000_000);
        assert!(token.is_consistent());
    }

    #[test]
    fn test_metadata_validation() {
        let issuer = Address::derive("issuer");
        let addr = Address::derive("t");
        assert!(Erc20Token::new(addr, "".into(), "X".into(), 18, 1, issuer).is_err());
        assert!(Erc20Token::new(addr, "X".into(), "TOOLONGSYM".into(), 18, 1, issuer).is_err());
        assert!(Erc20Token::new(addr, "X".into(), "X".into(), 19, 1, issuer).is_err());
        assert!(Erc20Token::new(addr, "X".into(), "X".into(), 18, 0, issuer).is_ok());
    }

    #[test]
    fn test_transfer_and_insufficient_balance() {
        let (mut token, issuer) = token();
        let bob = Address::derive("bob");
        token.transfer(&issuer, &bob, 400).unwrap();
        assert_eq!(token.balance_of(&bob), 400);
        assert!(token.transfer(&bob, &issuer, 401).is_err());
        assert_eq!(token.balance_of(&bob), 400);
        assert!(token.is_consistent());
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let (mut token, issuer) = token();
        let dex = Address::derive("dex");
        token.approve(&issuer, &dex, 500).unwrap();
        token.transfer_from(&dex, &issuer, &dex, 300).unwrap();
        assert_eq!(token.allowance(&issuer, &dex), 200);
        assert_eq!(token.balance_of(&dex), 300);

        let err = token.transfer_from(&dex, &issuer, &dex, 201).unwrap_err();
        assert!(err.contains("Allowance exceeded"));
    }

    #[test]
    fn test_mint_issuer_only_and_burn() {
        let (mut token, issuer) = token();
        let bob = Address::derive("bob");
        assert!(token.mint(&bob, &bob, 1).is_err());
        token.mint(&issuer, &bob, 50).unwrap();
        assert_eq!(token.total_supply(), 1_000_050);
        token.burn(&bob, 20).unwrap();
        assert_eq!(token.balance_of(&bob), 30);
        assert_eq!(token.total_supply(), 1_000_030);
        assert!(token.is_consistent());
    }

    #[test]
    fn test_execute_action_json() {
        let (mut token, issuer) = token();
        let bob = Address::derive("bob");
        let json = format!(r#"{{"action":"Transfer","to":"{}","amount":"25"}}"#, bob);
        let action: TokenAction = serde_json::from_str(&json).unwrap();
        let resp = token.execute(&issuer, action);
        assert!(resp.success);
        assert_eq!(resp.events.len(), 1);
        assert_eq!(token.balance_of(&bob), 25);

        let resp = token.execute(&bob, TokenAction::Burn { amount: 26 });
        assert!(!resp.success);
        assert!(resp.events.is_empty());
    }
}
