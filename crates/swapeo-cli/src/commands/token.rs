use crate::commands::common::{load_chain, resolve_account, resolve_token, CliResult};
use crate::{print_success, TokenCommands};
use colored::*;
use std::path::Path;
use swapeo_core::TokenHost;

pub fn handle(action: TokenCommands, state: &Path) -> CliResult<()> {
    let mut chain = load_chain(state)?;

    match action {
        TokenCommands::Create {
            symbol,
            name,
            decimals,
            supply,
            issuer,
        } => {
            let issuer = resolve_account(&chain, &issuer)?;
            let address = chain
                .host
                .create_token(&symbol, &name, decimals, supply, issuer)?;
            chain.save_to_file(state)?;
            print_success(&format!("Token {} created", symbol.yellow()));
            println!("  Address: {}", address);
            println!("  Issuer:  {}", issuer);
            println!("  Supply:  {}", supply);
        }
        TokenCommands::Mint {
            symbol,
            to,
            amount,
            issuer,
        } => {
            let token = resolve_token(&symbol)?;
            let to_addr = resolve_account(&chain, &to)?;
            let issuer = resolve_account(&chain, &issuer)?;
            chain.host.mint(&token, &issuer, &to_addr, amount)?;
            chain.save_to_file(state)?;
            print_success(&format!("Minted {} {} to {}", amount, symbol, to));
        }
        TokenCommands::Approve {
            symbol,
            owner,
            spender,
            amount,
        } => {
            let token = resolve_token(&symbol)?;
            let owner_addr = resolve_account(&chain, &owner)?;
            let spender_addr = resolve_account(&chain, &spender)?;
            chain
                .host
                .approve(&token, &owner_addr, &spender_addr, amount)?;
            chain.save_to_file(state)?;
            print_success(&format!(
                "{} approved {} to spend {} {}",
                owner, spender, amount, symbol
            ));
        }
        TokenCommands::Balance { symbol, account } => {
            let token = resolve_token(&symbol)?;
            let holder = resolve_account(&chain, &account)?;
            let balance = chain.host.balance_of(&token, &holder);
            println!(
                "  {} {} {}",
                account.cyan(),
                balance.to_string().white().bold(),
                symbol.yellow()
            );
        }
    }
    Ok(())
}
