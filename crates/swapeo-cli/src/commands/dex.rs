use crate::commands::common::{
    load_chain, resolve_account, resolve_token, token_label, transact, CliResult,
};
use crate::{print_info, print_success, DexCommands};
use colored::Colorize;
use std::path::Path;
use swapeo_dex::{PoolInfo, PairState};
use swapeo_vm::{Chain, Route};

/// Handle DEX subcommands.
pub fn handle(action: DexCommands, state: &Path) -> CliResult<()> {
    match action {
        DexCommands::Deposit {
            from,
            token_x,
            token_y,
            amount_x,
            amount_y,
        } => {
            let chain = load_chain(state)?;
            let caller = resolve_account(&chain, &from)?;
            let (x, y) = (resolve_token(&token_x)?, resolve_token(&token_y)?);
            let receipt = transact(state, |chain| {
                chain.execute(|dex, host| dex.deposit(host, caller, x, y, amount_x, amount_y))
            })?;
            print_success(&format!("Deposited {} {} + {} {}", amount_x, token_x, amount_y, token_y));
            println!("  Pair:  {}", receipt.pair_key);
            println!("  Units: {} / {}", receipt.units_a, receipt.units_b);
        }
        DexCommands::Withdraw {
            from,
            token_x,
            token_y,
            amount,
        } => {
            let chain = load_chain(state)?;
            let caller = resolve_account(&chain, &from)?;
            let (x, y) = (resolve_token(&token_x)?, resolve_token(&token_y)?);
            let receipt = transact(state, |chain| {
                chain.execute(|dex, host| dex.withdraw(host, caller, x, y, amount))
            })?;
            print_success("Liquidity withdrawn");
            println!("  Units burned: {} / {}", receipt.units_a, receipt.units_b);
            println!("  Received:     {} / {}", receipt.amount_a, receipt.amount_b);
        }
        DexCommands::Swap {
            from,
            token_in,
            token_out,
            amount_in,
            min_out,
            fallback,
        } => {
            let chain = load_chain(state)?;
            let caller = resolve_account(&chain, &from)?;
            let (tin, tout) = (resolve_token(&token_in)?, resolve_token(&token_out)?);
            let route = transact(state, |chain| {
                if fallback {
                    chain.swap_or_forward(caller, tin, tout, amount_in, min_out)
                } else {
                    chain
                        .execute(|dex, host| dex.swap(host, caller, tin, tout, amount_in, min_out))
                        .map(Route::Internal)
                }
            })?;
            match route {
                Route::Internal(r) => {
                    print_success(&format!(
                        "Swapped {} {} for {} {}",
                        r.amount_in, token_in, r.amount_out, token_out
                    ));
                    println!("  Fee: {} {}", r.fee, token_in);
                }
                Route::Forwarded(r) => {
                    print_info("No internal liquidity, forwarded to router");
                    print_success(&format!(
                        "Swapped {} {} for {} {}",
                        r.amount_in, token_in, r.amount_out, token_out
                    ));
                    println!("  Protocol fee: {} {}", r.fee, token_in);
                }
            }
        }
        DexCommands::Forward {
            from,
            token_in,
            token_out,
            amount_in,
            min_out,
        } => {
            let chain = load_chain(state)?;
            let caller = resolve_account(&chain, &from)?;
            let (tin, tout) = (resolve_token(&token_in)?, resolve_token(&token_out)?);
            let r = transact(state, |chain| {
                chain.execute(|dex, host| {
                    dex.forward_to_uniswap(host, caller, tin, tout, amount_in, min_out)
                })
            })?;
            print_success(&format!(
                "Router swapped {} {} for {} {}",
                r.amount_routed, token_in, r.amount_out, token_out
            ));
            println!("  Protocol fee: {} {}", r.fee, token_in);
        }
        DexCommands::Distribute {
            from,
            token_x,
            token_y,
            token,
        } => {
            let chain = load_chain(state)?;
            let caller = resolve_account(&chain, &from)?;
            let (x, y, t) = (
                resolve_token(&token_x)?,
                resolve_token(&token_y)?,
                resolve_token(&token)?,
            );
            let dist = transact(state, |chain| {
                chain.execute(|dex, _| dex.distribute_fees(caller, x, y, t))
            })?;
            print_success(&format!(
                "Distributed {} {} to {} providers",
                dist.total_fees,
                token,
                dist.credits.len()
            ));
            for (provider, units) in &dist.credits {
                println!("  {} +{}", provider, units);
            }
            if dist.dust > 0 {
                println!("  Dust kept by the pool: {}", dist.dust);
            }
        }
        DexCommands::Pool { token_x, token_y } => {
            let chain = load_chain(state)?;
            let key = swapeo_dex::resolve_pair_key(&resolve_token(&token_x)?, &resolve_token(&token_y)?)?;
            match chain.dex.pool_info(&key) {
                Some(info) => print_pool(&chain, &info),
                None => println!("  {}", "Pair does not exist".dimmed()),
            }
        }
        DexCommands::Pools => {
            let chain = load_chain(state)?;
            let pools = chain.dex.list_pairs();
            println!("{}", format!("DEX Pairs ({})", pools.len()).cyan().bold());
            println!("{}", "─".repeat(70));
            for info in &pools {
                println!(
                    "  {} / {} | Reserves: {} / {} | {:?}",
                    token_label(&chain, &info.token_a).green(),
                    token_label(&chain, &info.token_b).green(),
                    info.reserve_a.to_string().white(),
                    info.reserve_b.to_string().white(),
                    info.state,
                );
            }
            if pools.is_empty() {
                println!("  {}", "No pairs found".dimmed());
            }
        }
        DexCommands::Position {
            token_x,
            token_y,
            provider,
        } => {
            let chain = load_chain(state)?;
            let who = resolve_account(&chain, &provider)?;
            let (x, y) = (resolve_token(&token_x)?, resolve_token(&token_y)?);
            let pos = chain.dex.position(&x, &y, &who)?;
            let pair = chain.dex.get_pair(&x, &y)?;
            println!("{}", format!("Position of {}", provider).cyan().bold());
            println!("{}", "─".repeat(50));
            println!(
                "  {}: {} units ({} bps) → {}",
                token_label(&chain, &pair.token_a),
                pos.units_a,
                pos.share_a_bps,
                pos.redeemable_a
            );
            println!(
                "  {}: {} units ({} bps) → {}",
                token_label(&chain, &pair.token_b),
                pos.units_b,
                pos.share_b_bps,
                pos.redeemable_b
            );
        }
        DexCommands::Quote {
            token_in,
            token_out,
            amount_in,
        } => {
            let chain = load_chain(state)?;
            let (tin, tout) = (resolve_token(&token_in)?, resolve_token(&token_out)?);
            println!("{}", "Swap Quote".cyan().bold());
            println!("{}", "─".repeat(50));
            match chain.dex.quote(&tin, &tout, amount_in) {
                Ok(q) => {
                    println!("  Internal:  {} {} (fee {})", q.amount_out, token_out, q.fee);
                    println!("  Impact:    {} bps", q.price_impact_bps);
                }
                Err(e) => println!("  Internal:  {}", e.to_string().dimmed()),
            }
            match chain.dex.quote_forward(&chain.host, tin, tout, amount_in) {
                Ok(out) => println!("  Router:    {} {}", out, token_out),
                Err(e) => println!("  Router:    {}", e.to_string().dimmed()),
            }
        }
        DexCommands::ProtocolFees { token } => {
            let chain = load_chain(state)?;
            let t = resolve_token(&token)?;
            println!("  Protocol fees: {} {}", chain.dex.protocol_fees(&t), token.yellow());
        }
        DexCommands::Events { since } => {
            let chain = load_chain(state)?;
            for logged in chain.events().iter().filter(|e| e.block >= since) {
                println!("{}", serde_json::to_string(logged)?);
            }
        }
    }
    Ok(())
}

fn print_pool(chain: &Chain, info: &PoolInfo) {
    let label_a = token_label(chain, &info.token_a);
    let label_b = token_label(chain, &info.token_b);
    println!("{}", "Pair Info".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Key:        {}", info.pair_key.to_string().yellow());
    println!("  Tokens:     {} / {}", label_a.green(), label_b.green());
    println!("  Reserves:   {} / {}", info.reserve_a, info.reserve_b);
    println!("  LP units:   {} / {}", info.total_units_a, info.total_units_b);
    println!("  Fees:       {} {} / {} {}", info.fees_a, label_a, info.fees_b, label_b);
    println!("  Providers:  {}", info.providers);
    let state = match info.state {
        PairState::Active => "active".green(),
        PairState::Drained => "drained".red(),
        PairState::NonExistent => "missing".dimmed(),
    };
    println!("  State:      {}", state);
}
