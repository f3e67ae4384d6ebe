//! CryptoWallet CLI - custodial wallets in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cryptowallet_core::{init_logging, LogFormat};

mod commands;
mod output;

use commands::{admin, auth, config, history, send, wallet};

/// cw - custodial crypto wallets in your terminal
#[derive(Parser)]
#[command(name = "cw", version, about, long_about = None)]
struct Cli {
    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as a user
    Login {
        username: String,
        /// Password (prompted when omitted)
        #[arg(long, short, env = "CRYPTOWALLET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a user account and sign in
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Password (prompted with confirmation when omitted)
        #[arg(long, short)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out of both user and admin sessions
    Logout,

    /// Show the signed-in identity
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or switch the mode (user or admin)
    Mode {
        /// Mode to switch to; switching signs out of the other mode
        mode: Option<String>,
    },

    /// Manage your wallets
    Wallet {
        #[command(subcommand)]
        command: wallet::WalletCommands,
    },

    /// Send funds from one of your wallets
    Send {
        /// Wallet ID to send from
        #[arg(long)]
        wallet: i64,
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in the wallet's currency
        #[arg(long)]
        amount: String,
        /// Optional memo
        #[arg(long)]
        memo: Option<String>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show transaction history, newest first
    History {
        /// Only this wallet (default: all your wallets)
        #[arg(long)]
        wallet: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommands,
    },

    /// Show or change client settings
    Config {
        #[command(subcommand)]
        command: Option<config::ConfigCommands>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let format = if cli.log_json { LogFormat::Json } else { LogFormat::Human };
    if let Err(e) = init_logging(format, &cli.log_level) {
        output::warning(&e.to_string());
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            output::error(&format!("Failed to start runtime: {}", e));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Login { username, password, json } => auth::login(&username, password, json).await,
        Commands::Register { username, email, first_name, last_name, password, json } => {
            auth::register(username, email, first_name, last_name, password, json).await
        }
        Commands::Logout => auth::logout(),
        Commands::Whoami { json } => auth::whoami(json),
        Commands::Mode { mode } => auth::mode(mode.as_deref()),
        Commands::Wallet { command } => wallet::run(command).await,
        Commands::Send { wallet, to, amount, memo, yes, json } => {
            send::run(wallet, &to, &amount, memo, yes, json).await
        }
        Commands::History { wallet, json } => history::run(wallet, json).await,
        Commands::Admin { command } => admin::run(command).await,
        Commands::Config { command } => config::run(command),
    }
}
