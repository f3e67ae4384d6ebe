//! CLI command implementations

pub mod admin;
pub mod auth;
pub mod config;
pub mod history;
pub mod send;
pub mod wallet;

use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::Password;

use cryptowallet_core::WalletContext;

/// Get the data directory from environment or default
pub fn get_data_dir() -> PathBuf {
    match std::env::var("CRYPTOWALLET_DIR") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cryptowallet"),
    }
}

/// Load config and the persisted session
pub fn get_context() -> Result<WalletContext> {
    let dir = get_data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory: {:?}", dir))?;
    WalletContext::new(&dir).context("Failed to initialize wallet context")
}

/// Use the flag value or prompt without echo
pub fn password_or_prompt(flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = flag {
        return Ok(p);
    }
    Ok(Password::new().with_prompt(prompt).interact()?)
}

/// Prompt twice for a new password
pub fn new_password_or_prompt(flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = flag {
        return Ok(p);
    }
    Ok(Password::new()
        .with_prompt(prompt)
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?)
}
