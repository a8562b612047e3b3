use crate::{print_info, print_success};
use colored::*;
use log::debug;
use std::path::Path;
use swapeo_core::{Address, DexConfig, DexResult};
use swapeo_vm::{account_address, token_address, Chain};

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Loads the devnet state written by `swapeo init`.
pub fn load_chain(path: &Path) -> CliResult<Chain> {
    if !path.exists() {
        return Err(format!(
            "No devnet at {} (run `swapeo init` first)",
            path.display()
        )
        .into());
    }
    Chain::load_from_file(path)
}

/// Load, run one DEX transaction, persist on success.
/// A reverted transaction leaves the state file untouched.
pub fn transact<T>(path: &Path, f: impl FnOnce(&mut Chain) -> DexResult<T>) -> CliResult<T> {
    let mut chain = load_chain(path)?;
    let value = f(&mut chain).map_err(|e| format!("{} [{}]", e, e.code()))?;
    chain.save_to_file(path)?;
    debug!("block {} saved to {}", chain.block, path.display());
    Ok(value)
}

/// Account by hex address or by name. `dex` and `router` are reserved.
pub fn resolve_account(chain: &Chain, name: &str) -> CliResult<Address> {
    match name {
        "dex" => Ok(chain.dex.address()),
        "router" => Ok(chain.dex.config().router),
        _ => resolve_name(name),
    }
}

fn resolve_name(name: &str) -> CliResult<Address> {
    if name.starts_with("0x") {
        Ok(name.parse::<Address>()?)
    } else {
        Ok(account_address(name))
    }
}

/// Token by hex address or by symbol.
pub fn resolve_token(symbol: &str) -> CliResult<Address> {
    if symbol.starts_with("0x") {
        Ok(symbol.parse::<Address>()?)
    } else {
        Ok(token_address(symbol))
    }
}

/// Display label for a token address: its symbol if known.
pub fn token_label(chain: &Chain, token: &Address) -> String {
    chain
        .host
        .token(token)
        .map(|t| t.metadata.symbol.clone())
        .unwrap_or_else(|| token.to_hex())
}

pub fn init(
    path: &Path,
    config_file: Option<&Path>,
    owner: &str,
    router: &str,
    timestamp: u64,
) -> CliResult<()> {
    let config = match config_file {
        Some(file) => {
            print_info(&format!("Loading config from {}", file.display()));
            DexConfig::load_from_file(file)?
        }
        None if std::env::var("SWAPEO_OWNER").is_ok() => {
            print_info("Loading config from SWAPEO_* environment");
            DexConfig::load_from_env()?
        }
        None => DexConfig::new(resolve_name(owner)?, resolve_name(router)?),
    };

    if path.exists() {
        print_info(&format!("Replacing existing devnet at {}", path.display()));
    }
    let chain = Chain::new(config, timestamp)?;
    chain.save_to_file(path)?;

    print_success("DEX deployed");
    println!("  DEX:        {}", chain.dex.address().to_string().green());
    println!("  Owner:      {}", chain.dex.owner());
    println!("  Router:     {}", chain.dex.config().router);
    println!(
        "  Swap fee:   {} bps | Forward fee: {} bps",
        chain.dex.config().swap_fee_bps,
        chain.dex.config().forward_fee_bps
    );
    println!("  State file: {}", path.display());
    Ok(())
}

pub fn status(path: &Path) -> CliResult<()> {
    let chain = load_chain(path)?;
    println!("{}", "Devnet Status".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Block:      {}", chain.block);
    println!("  Timestamp:  {}", chain.host.timestamp);
    println!("  DEX:        {}", chain.dex.address());
    println!("  Pairs:      {}", chain.dex.pair_count());
    println!("  Tokens:     {}", chain.host.tokens.len());
    println!("  Events:     {}", chain.events().len());
    Ok(())
}

pub fn advance(path: &Path, secs: u64) -> CliResult<()> {
    let mut chain = load_chain(path)?;
    chain.host.advance_time(secs);
    chain.save_to_file(path)?;
    print_success(&format!("Clock at {}", chain.host.timestamp));
    Ok(())
}
