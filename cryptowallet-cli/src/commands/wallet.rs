//! Wallet commands - list, create, refresh and deactivate your wallets

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use cryptowallet_core::domain::{CryptoCurrency, Wallet};
use cryptowallet_core::services::Reloaded;
use cryptowallet_core::OperationResult;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum WalletCommands {
    /// List your wallets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new wallet
    Create {
        /// Currency (BTC, USDT)
        currency: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resync a wallet's balance from the chain
    Refresh {
        /// Wallet ID
        id: i64,
    },
    /// Deactivate a wallet (it can no longer send)
    Deactivate {
        /// Wallet ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub async fn run(command: WalletCommands) -> Result<()> {
    let ctx = get_context()?;
    let mut wallets = ctx.wallet_workflow()?;

    match command {
        WalletCommands::List { json } => {
            let list = output::spin("Loading wallets...", wallets.load()).await?;
            if json {
                return output::json(&list);
            }
            print_wallets(list);
        }
        WalletCommands::Create { currency, json } => {
            let currency: CryptoCurrency = currency.parse()?;
            let created = output::spin("Creating wallet...", wallets.create(currency)).await?;
            if json {
                return output::json(&OperationResult::ok(&created.value));
            }
            output::success(&format!(
                "Created {} wallet #{}",
                currency.info().name,
                created.value.id
            ));
            println!("  Address: {}", created.value.address);
            warn_if_stale(&created);
        }
        WalletCommands::Refresh { id } => {
            let result = output::spin("Refreshing balance...", wallets.refresh_balance(id)).await?;
            match wallets.wallet(id) {
                Some(wallet) => output::success(&format!(
                    "Wallet #{} balance: {}",
                    id,
                    wallet.formatted_balance()
                )),
                None => output::success(&format!("Balance refresh requested for wallet #{}", id)),
            }
            warn_if_stale(&result);
        }
        WalletCommands::Deactivate { id, force } => {
            if !force
                && !Confirm::new()
                    .with_prompt(format!("Deactivate wallet #{}? It will no longer be able to send.", id))
                    .default(false)
                    .interact()?
            {
                println!("Cancelled.");
                return Ok(());
            }
            let result = output::spin("Deactivating wallet...", wallets.deactivate(id)).await?;
            output::success(&format!("Wallet #{} deactivated", id));
            warn_if_stale(&result);
        }
    }

    Ok(())
}

fn print_wallets(wallets: &[Wallet]) {
    if wallets.is_empty() {
        println!("No wallets yet. Create one with 'cw wallet create BTC'.");
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Currency", "Address", "Balance", "Status", "Created"]);
    for wallet in wallets {
        table.add_row(vec![
            wallet.id.to_string(),
            wallet.currency.info().symbol.to_string(),
            wallet.short_address(10),
            wallet.formatted_balance(),
            output::active_label(wallet.active).to_string(),
            output::format_time(&wallet.created_at),
        ]);
    }
    println!("{}", table);
}

pub fn warn_if_stale<T>(result: &Reloaded<T>) {
    if let Some(e) = &result.reload_error {
        output::warning(&format!("Done, but the wallet list could not be reloaded: {}", e));
        println!("{}", "Run 'cw wallet list' to retry.".dimmed());
    }
}
