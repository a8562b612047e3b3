use crate::commands::common::{load_chain, resolve_account, resolve_token, token_label, CliResult};
use crate::{print_info, print_success, RouterCommands};
use colored::*;
use std::path::Path;

pub fn handle(action: RouterCommands, state: &Path) -> CliResult<()> {
    let mut chain = load_chain(state)?;
    let router = chain.dex.config().router;

    match action {
        RouterCommands::AddPool {
            provider,
            token_x,
            token_y,
            amount_x,
            amount_y,
        } => {
            let provider = resolve_account(&chain, &provider)?;
            let x = resolve_token(&token_x)?;
            let y = resolve_token(&token_y)?;
            chain
                .host
                .add_router_liquidity(&router, &provider, x, y, amount_x, amount_y)?;
            chain.save_to_file(state)?;
            print_success(&format!(
                "Router pool {}/{} funded with {} / {}",
                token_x, token_y, amount_x, amount_y
            ));
        }
        RouterCommands::Fail { off } => {
            chain.host.set_router_failing(&router, !off)?;
            chain.save_to_file(state)?;
            if off {
                print_success("Router swaps enabled");
            } else {
                print_info("Router swaps will revert");
            }
        }
        RouterCommands::Pools => {
            let book = chain
                .host
                .router(&router)
                .ok_or_else(|| format!("Unknown router {}", router))?;
            println!(
                "{}",
                format!("Router {} ({} bps)", router, book.fee_bps).cyan().bold()
            );
            println!("{}", "─".repeat(70));
            let mut count = 0;
            for pool in book.pools() {
                count += 1;
                println!(
                    "  {} / {} | Reserves: {} / {}",
                    token_label(&chain, &pool.token_a).green(),
                    token_label(&chain, &pool.token_b).green(),
                    pool.reserve_a.to_string().white(),
                    pool.reserve_b.to_string().white(),
                );
            }
            if count == 0 {
                println!("  {}", "No pools found".dimmed());
            }
        }
    }
    Ok(())
}
