//! History command - transactions of one wallet or all of yours

use anyhow::Result;

use cryptowallet_core::domain::{Transaction, TransactionType};
use cryptowallet_core::services::HistoryScope;

use super::get_context;
use crate::output;

pub async fn run(wallet: Option<i64>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let user = ctx.require_user()?;
    let scope = match wallet {
        Some(id) => HistoryScope::Wallet(id),
        None => HistoryScope::User(user.id),
    };

    let mut history = ctx.history(scope)?;
    let transactions = output::spin("Loading transactions...", history.load()).await?;

    if json {
        return output::json(&transactions);
    }
    print_transactions(transactions);
    Ok(())
}

pub fn print_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Type", "Amount", "Status", "Counterparty", "Hash", "Date"]);
    for tx in transactions {
        let counterparty = match tx.direction {
            TransactionType::Send => &tx.to_address,
            TransactionType::Receive => &tx.from_address,
        };
        table.add_row(vec![
            tx.id.to_string(),
            format!("{} {}", tx.direction.arrow(), tx.direction),
            tx.amount.normalize().to_string(),
            output::status_label(tx.status).to_string(),
            counterparty.clone(),
            tx.short_hash(),
            output::format_time(&tx.created_at),
        ]);
    }
    println!("{}", table);
}
