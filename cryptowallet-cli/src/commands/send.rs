//! Send command - compose and submit a transaction

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::Confirm;

use cryptowallet_core::OperationResult;

use super::get_context;
use super::wallet::warn_if_stale;
use crate::output;

pub async fn run(
    wallet_id: i64,
    to: &str,
    amount: &str,
    memo: Option<String>,
    yes: bool,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let mut dashboard = ctx.user_dashboard()?;
    output::spin("Loading wallets...", dashboard.wallets_mut().load()).await?;

    let composer = dashboard
        .select_wallet(wallet_id)
        .with_context(|| format!("Cannot send from wallet #{}", wallet_id))?;
    composer.set_recipient(to);
    composer.set_amount_text(amount);
    if let Some(memo) = memo {
        composer.set_memo(memo);
    }

    let request = composer.check()?;
    let wallet = composer.wallet().clone();
    let amount_text = wallet.currency.format_amount(request.amount);

    if !yes && !json {
        println!("  From:    #{} ({})", wallet.id, wallet.short_address(10));
        println!("  To:      {}", request.to_address);
        println!("  Amount:  {}", amount_text.bold());
        println!("  Balance: {}", wallet.formatted_balance());
        if let Some(memo) = &request.memo {
            println!("  Memo:    {}", memo);
        }
        if !Confirm::new()
            .with_prompt("Send this transaction?")
            .default(false)
            .interact()?
        {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let sent = match output::spin("Sending...", dashboard.submit_send()).await {
        Ok(sent) => sent,
        Err(e) => {
            let message = e.user_message();
            if json {
                output::json(&OperationResult::<()>::from(Err(e)))?;
            }
            bail!(message);
        }
    };

    if json {
        return output::json(&OperationResult::ok(&sent.value));
    }
    output::success(&format!("Transaction sent successfully! Hash: {}", sent.value.hash));
    println!("  Status: {}", output::status_label(sent.value.status));
    if let Some(wallet) = dashboard.wallets().wallet(wallet_id) {
        println!("  New balance: {}", wallet.formatted_balance());
    }
    warn_if_stale(&sent);
    Ok(())
}
