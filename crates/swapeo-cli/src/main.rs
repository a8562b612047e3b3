// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SWAPEO CLI - Devnet driver for the Swapeo DEX
//
// Every command loads the devnet state file, runs one transaction against it
// and writes it back. Accounts are referred to by name ("alice") or by hex
// address; tokens by symbol or hex address. "dex" and "router" resolve to the
// deployed contract and its configured router.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "swapeo")]
#[command(about = "Swapeo DEX - local devnet CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Devnet state file (default: ~/.swapeo/devnet.json)
    #[arg(short, long, env = "SWAPEO_STATE")]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a fresh DEX, replacing any existing devnet state
    Init {
        /// TOML config file; falls back to SWAPEO_* env vars, then to --owner/--router
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Owner account name or address
        #[arg(long, default_value = "owner")]
        owner: String,

        /// Router account name or address
        #[arg(long, default_value = "router")]
        router: String,

        /// Initial block timestamp
        #[arg(long, default_value_t = 1_700_000_000)]
        timestamp: u64,
    },

    /// Show chain height, clock and pair count
    Status,

    /// Move the block clock forward
    Advance {
        /// Seconds
        secs: u64,
    },

    /// Token operations
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },

    /// Mock router operations
    Router {
        #[command(subcommand)]
        action: RouterCommands,
    },

    /// DEX operations
    Dex {
        #[command(subcommand)]
        action: DexCommands,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Create a token with its supply credited to the issuer
    Create {
        /// Ticker symbol (max 8 chars)
        symbol: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value_t = 18)]
        decimals: u8,

        /// Initial supply in atomic units
        #[arg(long, default_value = "0")]
        supply: u128,

        #[arg(short, long)]
        issuer: String,
    },

    /// Mint (issuer only)
    Mint {
        symbol: String,

        #[arg(short, long)]
        to: String,

        #[arg(short, long)]
        amount: u128,

        #[arg(short, long)]
        issuer: String,
    },

    /// Set an allowance
    Approve {
        symbol: String,

        #[arg(short, long)]
        owner: String,

        #[arg(short, long)]
        spender: String,

        #[arg(short, long)]
        amount: u128,
    },

    /// Show a balance
    Balance {
        symbol: String,

        account: String,
    },
}

#[derive(Subcommand)]
enum RouterCommands {
    /// Seed a router pool from a provider's balances
    AddPool {
        #[arg(short, long)]
        provider: String,

        token_x: String,
        token_y: String,
        amount_x: u128,
        amount_y: u128,
    },

    /// Make every router swap revert (or stop doing so)
    Fail {
        #[arg(long)]
        off: bool,
    },

    /// List router pools
    Pools,
}

#[derive(Subcommand)]
enum DexCommands {
    /// Add liquidity (creates the pair on first deposit)
    Deposit {
        #[arg(short, long)]
        from: String,

        token_x: String,
        token_y: String,
        amount_x: u128,
        amount_y: u128,
    },

    /// Remove liquidity; AMOUNT is in units of TOKEN_X
    Withdraw {
        #[arg(short, long)]
        from: String,

        token_x: String,
        token_y: String,
        amount: u128,
    },

    /// Swap against internal liquidity
    Swap {
        #[arg(short, long)]
        from: String,

        token_in: String,
        token_out: String,
        amount_in: u128,

        /// Minimum acceptable output (0 = no check)
        #[arg(long, default_value = "0")]
        min_out: u128,

        /// Forward to the router when the pair has no liquidity
        #[arg(long)]
        fallback: bool,
    },

    /// Forward a swap to the external router
    Forward {
        #[arg(short, long)]
        from: String,

        token_in: String,
        token_out: String,
        amount_in: u128,

        #[arg(long, default_value = "0")]
        min_out: u128,
    },

    /// Distribute accumulated fees to LPs (owner only)
    Distribute {
        #[arg(short, long)]
        from: String,

        token_x: String,
        token_y: String,

        /// Fee token to distribute
        #[arg(long)]
        token: String,
    },

    /// Show a pair
    Pool { token_x: String, token_y: String },

    /// List all pairs
    Pools,

    /// Show an LP position
    Position {
        token_x: String,
        token_y: String,
        provider: String,
    },

    /// Quote a swap (internal pool and router)
    Quote {
        token_in: String,
        token_out: String,
        amount_in: u128,
    },

    /// Show protocol fees retained from forwarded swaps
    ProtocolFees { token: String },

    /// Print the event log as JSON lines
    Events {
        /// Only events from this block on
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    print_banner();

    let state_path = cli.state.unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join(".swapeo")
            .join("devnet.json")
    });
    if let Some(parent) = state_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let result = match cli.command {
        Commands::Init {
            config,
            owner,
            router,
            timestamp,
        } => commands::common::init(&state_path, config.as_deref(), &owner, &router, timestamp),
        Commands::Status => commands::common::status(&state_path),
        Commands::Advance { secs } => commands::common::advance(&state_path, secs),
        Commands::Token { action } => commands::token::handle(action, &state_path),
        Commands::Router { action } => commands::router::handle(action, &state_path),
        Commands::Dex { action } => commands::dex::handle(action, &state_path),
    };

    if let Err(e) = &result {
        print_error(&e.to_string());
    }
    result
}

fn print_banner() {
    println!(
        "{}",
        "╔═══════════════════════════════════════════════╗".cyan()
    );
    println!(
        "{}",
        "║          SWAPEO DEX - devnet CLI              ║"
            .cyan()
            .bold()
    );
    println!(
        "{}",
        "╚═══════════════════════════════════════════════╝".cyan()
    );
    println!();
}

fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

// ─────────────────────────────────────────────────────────────────
// UNIT TESTS
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_init_defaults() {
        let cli = Cli::try_parse_from(["swapeo", "init"]).unwrap();
        match cli.command {
            Commands::Init {
                config,
                owner,
                router,
                timestamp,
            } => {
                assert!(config.is_none());
                assert_eq!(owner, "owner");
                assert_eq!(router, "router");
                assert_eq!(timestamp, 1_700_000_000);
            }
            _ => panic!("Expected Init"),
        }
    }

    #[test]
    fn test_cli_dex_swap_with_fallback() {
        let cli = Cli::try_parse_from([
            "swapeo", "dex", "swap", "--from", "bob", "TKA", "TKB", "100", "--min-out", "150",
            "--fallback",
        ])
        .unwrap();
        match cli.command {
            Commands::Dex {
                action:
                    DexCommands::Swap {
                        from,
                        token_in,
                        token_out,
                        amount_in,
                        min_out,
                        fallback,
                    },
            } => {
                assert_eq!(from, "bob");
                assert_eq!(token_in, "TKA");
                assert_eq!(token_out, "TKB");
                assert_eq!(amount_in, 100);
                assert_eq!(min_out, 150);
                assert!(fallback);
            }
            _ => panic!("Expected Dex::Swap"),
        }
    }

    #[test]
    fn test_cli_large_amount_parses_as_u128() {
        let cli = Cli::try_parse_from([
            "swapeo",
            "token",
            "mint",
            "TKA",
            "--to",
            "alice",
            "--amount",
            "340282366920938463463374607431768211455",
            "--issuer",
            "alice",
        ])
        .unwrap();
        match cli.command {
            Commands::Token {
                action: TokenCommands::Mint { amount, .. },
            } => assert_eq!(amount, u128::MAX),
            _ => panic!("Expected Token::Mint"),
        }
    }

    #[test]
    fn test_cli_distribute_requires_token() {
        assert!(Cli::try_parse_from([
            "swapeo", "dex", "distribute", "--from", "owner", "TKA", "TKB"
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "swapeo", "dex", "distribute", "--from", "owner", "TKA", "TKB", "--token", "TKA"
        ])
        .is_ok());
    }

    #[test]
    fn test_cli_router_fail_toggle() {
        let cli = Cli::try_parse_from(["swapeo", "router", "fail", "--off"]).unwrap();
        match cli.command {
            Commands::Router {
                action: RouterCommands::Fail { off },
            } => assert!(off),
            _ => panic!("Expected Router::Fail"),
        }
    }
}
