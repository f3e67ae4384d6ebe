//! Config command - show and change client settings

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use cryptowallet_core::config::{Config, SETTINGS_FILE};

use super::get_data_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change settings in settings.json
    Set {
        /// Base URL of the wallet service API
        #[arg(long)]
        api_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Default rows per page: 10, 25, 50 or 100
        #[arg(long)]
        page_size: Option<u32>,
    },
}

pub fn run(command: Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Set { api_url, timeout, page_size }) => set(api_url, timeout, page_size),
        Some(ConfigCommands::Show { json }) => show(json),
        None => show(false),
    }
}

fn show(json: bool) -> Result<()> {
    let dir = get_data_dir();
    let config = Config::load(&dir)?;

    if json {
        return output::json(&json!({
            "apiBaseUrl": config.api_base_url,
            "requestTimeoutSecs": config.request_timeout.as_secs(),
            "defaultPageSize": config.default_page_size,
        }));
    }

    println!("{} {}", "API URL:".bold(), config.api_base_url);
    println!("{} {}s", "Timeout:".bold(), config.request_timeout.as_secs());
    println!("{} {}", "Page size:".bold(), config.default_page_size);
    println!("{}", format!("Settings file: {}", dir.join(SETTINGS_FILE).display()).dimmed());
    Ok(())
}

fn set(api_url: Option<String>, timeout: Option<u64>, page_size: Option<u32>) -> Result<()> {
    if api_url.is_none() && timeout.is_none() && page_size.is_none() {
        bail!("Nothing to change. Pass --api-url, --timeout or --page-size");
    }

    // Environment overrides must not end up in the file
    let dir = get_data_dir();
    let mut config = Config::from_file(&dir)?;
    if let Some(url) = api_url {
        config.set_api_base_url(&url)?;
    }
    if let Some(secs) = timeout {
        config.set_request_timeout_secs(secs)?;
    }
    if let Some(size) = page_size {
        config.set_default_page_size(size)?;
    }
    config.save(&dir)?;

    output::success("Settings saved");
    if std::env::var_os("CRYPTOWALLET_API_URL").is_some()
        || std::env::var_os("CRYPTOWALLET_TIMEOUT_SECS").is_some()
    {
        output::warning("Environment overrides still take precedence over settings.json");
    }
    Ok(())
}
