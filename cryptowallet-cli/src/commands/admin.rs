//! Admin commands - dashboard statistics, resource tables and account settings

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;

use cryptowallet_core::domain::{
    offered_page_size, AdminProfileUpdate, AdminRegistration, AdminRole, CryptoCurrency, Identity,
    IdentityKind, QueuePressure, Resource, SortDirection, TransactionFilters, TransactionStatus,
    TransactionType, User, UserFilters, Wallet, WalletFilters,
};
use cryptowallet_core::services::PaginatedResourceView;
use cryptowallet_core::OperationResult;

use super::auth::{login_as, register_admin_self};
use super::history::print_transactions;
use super::{get_context, new_password_or_prompt, password_or_prompt};
use crate::output;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Sign in as an admin
    Login {
        username: String,
        /// Password (prompted when omitted)
        #[arg(long, short, env = "CRYPTOWALLET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an admin account
    ///
    /// Signed in as a super admin this creates another admin and keeps your
    /// session. Otherwise it registers and signs in as the new admin.
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// SUPER_ADMIN, ADMIN, MODERATOR or SUPPORT
        #[arg(long, default_value = "SUPPORT")]
        role: String,
        /// Password (prompted with confirmation when omitted)
        #[arg(long, short)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show system statistics and health
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Registrations, transactions and volume over a period
    Analytics {
        /// First day (YYYY-MM-DD), default 30 days ago
        #[arg(long)]
        from: Option<String>,
        /// Last day (YYYY-MM-DD), default today
        #[arg(long)]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List or search users
    Users {
        #[command(flatten)]
        list: ListArgs,
        /// Only active (true) or inactive (false) users
        #[arg(long)]
        active: Option<bool>,
    },
    /// List or search wallets
    Wallets {
        #[command(flatten)]
        list: ListArgs,
        /// Only this currency (BTC, USDT)
        #[arg(long)]
        currency: Option<String>,
        /// Only active (true) or inactive (false) wallets
        #[arg(long)]
        active: Option<bool>,
    },
    /// List or search transactions
    Transactions {
        #[command(flatten)]
        list: ListArgs,
        /// PENDING, CONFIRMED or FAILED
        #[arg(long)]
        status: Option<String>,
        /// SEND or RECEIVE
        #[arg(long = "type")]
        direction: Option<String>,
    },
    /// Activate or deactivate a user
    ToggleUser { id: i64 },
    /// Activate or deactivate a wallet
    ToggleWallet { id: i64 },
    /// Resync a wallet's balance from the chain
    RefreshWallet { id: i64 },
    /// Change your admin password
    ChangePassword {
        /// Current password (prompted when omitted)
        #[arg(long)]
        current: Option<String>,
        /// New password (prompted with confirmation when omitted)
        #[arg(long)]
        new: Option<String>,
    },
    /// Update your admin profile
    UpdateProfile {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Paging, sorting and search shared by the resource tables
#[derive(Args)]
pub struct ListArgs {
    /// Search text; filters are ignored while searching
    #[arg(long, short)]
    query: Option<String>,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Rows per page: 10, 25, 50 or 100
    #[arg(long)]
    size: Option<u32>,
    /// Column to sort by
    #[arg(long)]
    sort: Option<String>,
    /// asc or desc
    #[arg(long, default_value = "desc")]
    dir: String,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(command: AdminCommands) -> Result<()> {
    let mut ctx = get_context()?;

    match command {
        AdminCommands::Login { username, password, json } => {
            login_as(&mut ctx, IdentityKind::Admin, &username, password, json).await?;
        }
        AdminCommands::Register { username, email, first_name, last_name, role, password, json } => {
            let role: AdminRole = role.parse()?;
            let password = new_password_or_prompt(password, "Password for the new admin")?;
            let registration = AdminRegistration {
                username,
                email,
                password,
                first_name,
                last_name,
                role,
            };

            if ctx.require_admin().is_err() {
                return register_admin_self(&mut ctx, registration, json).await;
            }
            let account = ctx.admin_account()?;
            let created =
                output::spin("Creating admin...", account.register_admin(&registration)).await?;
            if json {
                return output::json(&OperationResult::ok(&created));
            }
            output::success(&format!("Created {} admin '{}'", created.role, created.username));
        }
        AdminCommands::Stats { json } => {
            let mut view = ctx.stats_view()?;
            let stats = output::spin("Loading statistics...", view.activate()).await?.clone();
            let health = stats.health();

            if json {
                return output::json(&serde_json::json!({"stats": stats, "health": health}));
            }

            let mut table = output::create_table();
            table.set_header(vec!["Metric", "Value"]);
            table.add_row(vec!["Users".to_string(), format!("{} ({} active)", stats.total_users, stats.active_users)]);
            table.add_row(vec!["Registered today".to_string(), stats.users_registered_today.to_string()]);
            table.add_row(vec![
                "Wallets".to_string(),
                format!("{} ({} BTC, {} USDT)", stats.total_wallets, stats.bitcoin_wallets, stats.usdt_wallets),
            ]);
            table.add_row(vec!["Transactions".to_string(), stats.total_transactions.to_string()]);
            table.add_row(vec!["  pending".to_string(), stats.pending_transactions.to_string()]);
            table.add_row(vec!["  confirmed".to_string(), stats.confirmed_transactions.to_string()]);
            table.add_row(vec!["  failed".to_string(), stats.failed_transactions.to_string()]);
            table.add_row(vec!["Transactions today".to_string(), stats.transactions_today.to_string()]);
            table.add_row(vec![
                "BTC volume".to_string(),
                CryptoCurrency::Bitcoin.format_amount(stats.total_bitcoin_volume),
            ]);
            table.add_row(vec![
                "USDT volume".to_string(),
                CryptoCurrency::UsdtTrc20.format_amount(stats.total_usdt_volume),
            ]);
            println!("{}", table);

            let pressure = health.queue_pressure.to_string();
            let rate = health.failure_rate.to_string();
            println!(
                "Queue pressure: {}   Failure rate: {}",
                if health.queue_pressure == QueuePressure::High {
                    pressure.red()
                } else {
                    pressure.green()
                },
                if health.failure_rate.is_healthy() { rate.green() } else { rate.red() },
            );
            if let Some(at) = &stats.last_updated {
                println!("{}", format!("Updated {}", output::format_time(at)).dimmed());
            }
        }
        AdminCommands::Analytics { from, to, json } => {
            let view = ctx.stats_view()?;
            let today = Utc::now().date_naive();
            let end_day = match to {
                Some(s) => parse_day(&s)?,
                None => today,
            };
            let start_day = match from {
                Some(s) => parse_day(&s)?,
                None => end_day - Duration::days(30),
            };
            let start = NaiveDateTime::new(start_day, NaiveTime::MIN);
            let end = NaiveDateTime::new(end_day, last_second());

            let report = output::spin("Running analytics...", view.analytics(start, end)).await?;
            if json {
                return output::json(&report);
            }

            output::info(&format!("Analytics {} to {}", start_day, end_day));
            let mut table = output::create_table();
            table.add_row(vec!["Users registered".to_string(), report.users_registered.to_string()]);
            table.add_row(vec!["Transactions".to_string(), report.transactions.to_string()]);
            for volume in &report.volume {
                table.add_row(vec![
                    format!("{} volume", volume.currency.info().symbol),
                    volume.currency.format_amount(volume.amount),
                ]);
            }
            println!("{}", table);
        }
        AdminCommands::Users { list, active } => {
            let view = ctx.users_view()?;
            show_list(view, &list, UserFilters { active }, print_users).await?;
        }
        AdminCommands::Wallets { list, currency, active } => {
            let view = ctx.wallets_view()?;
            let filters = WalletFilters {
                currency: currency.as_deref().map(str::parse::<CryptoCurrency>).transpose()?,
                active,
            };
            show_list(view, &list, filters, print_wallets).await?;
        }
        AdminCommands::Transactions { list, status, direction } => {
            let view = ctx.transactions_view()?;
            let filters = TransactionFilters {
                status: status.as_deref().map(str::parse::<TransactionStatus>).transpose()?,
                direction: direction.as_deref().map(str::parse::<TransactionType>).transpose()?,
            };
            show_list(view, &list, filters, print_transactions).await?;
        }
        AdminCommands::ToggleUser { id } => {
            let mut view = ctx.users_view()?;
            output::spin("Updating user...", view.toggle_status(id)).await?;
            match view.rows().iter().find(|u| u.id == id) {
                Some(user) => output::success(&format!(
                    "User #{} ({}) is now {}",
                    id,
                    user.username,
                    output::active_label(user.active)
                )),
                None => output::success(&format!("User #{} status toggled", id)),
            }
        }
        AdminCommands::ToggleWallet { id } => {
            let mut view = ctx.wallets_view()?;
            output::spin("Updating wallet...", view.toggle_status(id)).await?;
            match view.rows().iter().find(|w| w.id == id) {
                Some(wallet) => output::success(&format!(
                    "Wallet #{} is now {}",
                    id,
                    output::active_label(wallet.active)
                )),
                None => output::success(&format!("Wallet #{} status toggled", id)),
            }
        }
        AdminCommands::RefreshWallet { id } => {
            let mut view = ctx.wallets_view()?;
            let api = ctx.api.clone();
            output::spin("Refreshing balance...", view.refresh_balance(api.as_ref(), id)).await?;
            match view.rows().iter().find(|w| w.id == id) {
                Some(wallet) => output::success(&format!(
                    "Wallet #{} balance: {}",
                    id,
                    wallet.formatted_balance()
                )),
                None => output::success(&format!("Balance refresh requested for wallet #{}", id)),
            }
        }
        AdminCommands::ChangePassword { current, new } => {
            let account = ctx.admin_account()?;
            let current = password_or_prompt(current, "Current password")?;
            let new = new_password_or_prompt(new, "New password")?;
            let message =
                output::spin("Changing password...", account.change_password(&current, &new)).await?;
            output::success(&message);
        }
        AdminCommands::UpdateProfile { email, first_name, last_name, json } => {
            let mut account = ctx.admin_account()?;
            let update = AdminProfileUpdate {
                email,
                first_name,
                last_name,
            };
            let updated = output::spin("Updating profile...", account.update_profile(&update))
                .await?
                .clone();
            ctx.auth
                .refresh_identity(Identity::Admin(updated.clone()))
                .context("Profile updated, but the local session could not be refreshed")?;
            if json {
                return output::json(&OperationResult::ok(&updated));
            }
            output::success("Profile updated");
            println!("  Name:  {} {}", updated.first_name, updated.last_name);
            println!("  Email: {}", updated.email);
        }
    }

    Ok(())
}

async fn show_list<R: Resource>(
    mut view: PaginatedResourceView<R>,
    args: &ListArgs,
    filters: R::Filters,
    render: fn(&[R::Item]),
) -> Result<()>
where
    R::Item: Serialize,
{
    if let Some(size) = args.size {
        view.set_size(offered_page_size(size)?)?;
    }
    let dir: SortDirection = args.dir.parse()?;
    let sort = args.sort.as_deref().unwrap_or(R::DEFAULT_SORT);
    view.set_sort(sort, dir)?;
    view.set_filters(filters);
    if let Some(query) = &args.query {
        view.set_query(query.as_str());
    }
    view.go_to_page(args.page.max(1) - 1);

    output::spin(&format!("Loading {}...", R::LABEL), view.load()).await?;

    if args.json {
        return output::json(view.page());
    }
    render(view.rows());
    println!("{}", output::page_footer(view.page()).dimmed());
    Ok(())
}

fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Username", "Name", "Email", "Status", "Joined"]);
    for user in users {
        table.add_row(vec![
            user.id.to_string(),
            user.username.clone(),
            format!("{} {}", user.first_name, user.last_name),
            user.email.clone(),
            output::active_label(user.active).to_string(),
            output::format_time(&user.created_at),
        ]);
    }
    println!("{}", table);
}

fn print_wallets(wallets: &[Wallet]) {
    if wallets.is_empty() {
        println!("No wallets found.");
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

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD", s))
}

fn last_second() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
