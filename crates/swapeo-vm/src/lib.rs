// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SWAPEO - EXECUTION ENVIRONMENT
//
// In-process chain for the DEX: a token bank of reference ERC-20 tokens, mock
// Uniswap-V2 routers and a block clock behind the `Host` traits, plus the
// transactional wrapper that gives every DEX call revert-on-error semantics.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod router;
pub mod token;

pub use router::{MockRouter, RouterPool, ROUTER_FEE_BPS};
pub use token::{Erc20Token, TokenAction, TokenEvent, TokenMetadata, TokenResponse};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use swapeo_core::{Address, DexConfig, DexError, DexEvent, DexResult, Host, RouterHost, TokenHost};
use swapeo_dex::SwapeoDex;

/// Deterministic address of the DEX contract on a fresh chain.
pub fn dex_address() -> Address {
    Address::derive("swapeo:dex")
}

/// Deterministic address of a token by symbol.
pub fn token_address(symbol: &str) -> Address {
    Address::derive(&format!("token:{}", symbol))
}

/// Deterministic address of a named account.
pub fn account_address(name: &str) -> Address {
    Address::derive(&format!("account:{}", name))
}

// ─────────────────────────────────────────────────────────────
// HOST
// ─────────────────────────────────────────────────────────────

/// Token bank, routers and clock. Individual calls are not atomic; wrap
/// them in [`Chain::execute`] for revert-on-error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainHost {
    pub tokens: BTreeMap<Address, Erc20Token>,
    pub routers: BTreeMap<Address, MockRouter>,
    /// Block timestamp (seconds)
    pub timestamp: u64,
}

impl ChainHost {
    pub fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    pub fn create_token(
        &mut self,
        symbol: &str,
        name: &str,
        decimals: u8,
        initial_supply: u128,
        issuer: Address,
    ) -> Result<Address, String> {
        let address = token_address(symbol);
        if self.tokens.contains_key(&address) {
            return Err(format!("Token {} already exists", symbol));
        }
        let token = Erc20Token::new(
            address,
            name.to_string(),
            symbol.to_string(),
            decimals,
            initial_supply,
            issuer,
        )?;
        self.tokens.insert(address, token);
        info!("token {} created at {}", symbol, address);
        Ok(address)
    }

    pub fn token(&self, address: &Address) -> Option<&Erc20Token> {
        self.tokens.get(address)
    }

    fn token_mut(&mut self, address: &Address) -> Result<&mut Erc20Token, String> {
        self.tokens
            .get_mut(address)
            .ok_or_else(|| format!("Unknown token {}", address))
    }

    pub fn mint(&mut self, token: &Address, caller: &Address, to: &Address, amount: u128) -> Result<(), String> {
        self.token_mut(token)?.mint(caller, to, amount).map(|_| ())
    }

    pub fn add_router(&mut self, address: Address) -> Result<(), String> {
        if address.is_zero() {
            return Err("Router address cannot be zero".to_string());
        }
        self.routers
            .entry(address)
            .or_insert_with(|| MockRouter::new(address));
        Ok(())
    }

    pub fn router(&self, address: &Address) -> Option<&MockRouter> {
        self.routers.get(address)
    }

    /// Seed a router pool from `provider`'s balances.
    pub fn add_router_liquidity(
        &mut self,
        router: &Address,
        provider: &Address,
        token_x: Address,
        token_y: Address,
        amount_x: u128,
        amount_y: u128,
    ) -> Result<(), String> {
        if !self.routers.contains_key(router) {
            return Err(format!("Unknown router {}", router));
        }
        self.token_mut(&token_x)?.transfer(provider, router, amount_x)?;
        self.token_mut(&token_y)?.transfer(provider, router, amount_y)?;
        self.routers
            .get_mut(router)
            .ok_or_else(|| format!("Unknown router {}", router))?
            .add_liquidity(token_x, token_y, amount_x, amount_y)
    }

    pub fn set_router_failing(&mut self, router: &Address, failing: bool) -> Result<(), String> {
        self.routers
            .get_mut(router)
            .map(|r| r.failing = failing)
            .ok_or_else(|| format!("Unknown router {}", router))
    }

    pub fn advance_time(&mut self, secs: u64) {
        self.timestamp = self.timestamp.saturating_add(secs);
    }
}

impl TokenHost for ChainHost {
    fn balance_of(&self, token: &Address, account: &Address) -> u128 {
        self.tokens
            .get(token)
            .map(|t| t.balance_of(account))
            .unwrap_or(0)
    }

    fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> u128 {
        self.tokens
            .get(token)
            .map(|t| t.allowance(owner, spender))
            .unwrap_or(0)
    }

    fn transfer(&mut self, token: &Address, sender: &Address, to: &Address, amount: u128) -> Result<(), String> {
        self.token_mut(token)?.transfer(sender, to, amount).map(|_| ())
    }

    fn transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), String> {
        self.token_mut(token)?
            .transfer_from(spender, from, to, amount)
            .map(|_| ())
    }

    fn approve(&mut self, token: &Address, owner: &Address, spender: &Address, amount: u128) -> Result<(), String> {
        self.token_mut(token)?.approve(owner, spender, amount).map(|_| ())
    }
}

impl RouterHost for ChainHost {
    fn get_amounts_out(&self, router: &Address, amount_in: u128, path: &[Address]) -> Result<Vec<u128>, String> {
        self.routers
            .get(router)
            .ok_or_else(|| format!("Unknown router {}", router))?
            .get_amounts_out(amount_in, path)
    }

    fn swap_exact_tokens_for_tokens(
        &mut self,
        router: &Address,
        sender: &Address,
        amount_in: u128,
        amount_out_min: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
    ) -> Result<Vec<u128>, String> {
        let mut book = self
            .routers
            .get(router)
            .cloned()
            .ok_or_else(|| format!("Unknown router {}", router))?;
        let amounts =
            book.swap_exact_tokens_for_tokens(amount_in, amount_out_min, path, deadline, self.timestamp)?;
        let token_in = path[0];
        let token_out = path[path.len() - 1];
        let amount_out = amounts[amounts.len() - 1];

        self.token_mut(&token_in)?
            .transfer_from(router, sender, router, amount_in)?;
        self.token_mut(&token_out)?.transfer(router, to, amount_out)?;
        self.routers.insert(*router, book);
        debug!(
            "router {} swapped {} {} -> {} {}",
            router, amount_in, token_in, amount_out, token_out
        );
        Ok(amounts)
    }
}

impl Host for ChainHost {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

// ─────────────────────────────────────────────────────────────
// CHAIN
// ─────────────────────────────────────────────────────────────

/// Event as recorded by the chain, stamped with its block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggedEvent {
    pub block: u64,
    pub timestamp: u64,
    pub event: DexEvent,
}

/// Outcome of [`Chain::swap_or_forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Internal(swapeo_dex::SwapReceipt),
    Forwarded(swapeo_dex::ForwardReceipt),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    pub dex: SwapeoDex,
    pub host: ChainHost,
    /// Number of committed transactions
    pub block: u64,
    #[serde(default)]
    log: Vec<LoggedEvent>,
}

impl Chain {
    /// Deploy a DEX on an empty chain, registering its router.
    pub fn new(config: DexConfig, timestamp: u64) -> DexResult<Self> {
        let mut host = ChainHost::new(timestamp);
        host.add_router(config.router).map_err(DexError::InvalidConfig)?;
        let dex = SwapeoDex::new(dex_address(), config)?;
        info!("Swapeo DEX deployed at {}", dex.address());
        Ok(Self {
            dex,
            host,
            block: 0,
            log: Vec::new(),
        })
    }

    /// Run one transaction. On error, DEX and host state are restored to
    /// the pre-call snapshot and emitted events are dropped.
    pub fn execute<T>(
        &mut self,
        f: impl FnOnce(&mut SwapeoDex, &mut ChainHost) -> DexResult<T>,
    ) -> DexResult<T> {
        let dex_snapshot = self.dex.clone();
        let host_snapshot = self.host.clone();

        match f(&mut self.dex, &mut self.host) {
            Ok(value) => {
                self.block += 1;
                for event in self.dex.take_events() {
                    debug!("block {}: {}", self.block, event.name());
                    self.log.push(LoggedEvent {
                        block: self.block,
                        timestamp: self.host.timestamp,
                        event,
                    });
                }
                Ok(value)
            }
            Err(e) => {
                warn!("transaction reverted: {} ({})", e, e.code());
                self.dex = dex_snapshot;
                self.host = host_snapshot;
                Err(e)
            }
        }
    }

    /// Caller-side fallback: try the internal pool, and only if it cannot
    /// serve the pair at all, forward to the router. Each attempt is its
    /// own transaction.
    pub fn swap_or_forward(
        &mut self,
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: u128,
        min_amount_out: u128,
    ) -> DexResult<Route> {
        match self.execute(|dex, host| dex.swap(host, caller, token_in, token_out, amount_in, min_amount_out)) {
            Ok(receipt) => Ok(Route::Internal(receipt)),
            Err(DexError::PairNotFoundOrEmpty) => {
                info!("no internal liquidity for {} -> {}, forwarding", token_in, token_out);
                self.execute(|dex, host| {
                    dex.forward_to_uniswap(host, caller, token_in, token_out, amount_in, min_amount_out)
                })
                .map(Route::Forwarded)
            }
            Err(e) => Err(e),
        }
    }

    /// All committed events, oldest first.
    pub fn events(&self) -> &[LoggedEvent] {
        &self.log
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let chain: Chain = serde_json::from_str(&content)?;
        chain.dex.config().validate()?;
        Ok(chain)
    }
}
