//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "apiBaseUrl": "http://localhost:8080/api",
//!   "requestTimeoutSecs": 30,
//!   "defaultPageSize": 10
//! }
//! ```
//! Keys this crate does not know about are kept as-is when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::http::{normalize_base_url, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::domain::page::{offered_page_size, MAX_PAGE_SIZE};
use crate::services::DEFAULT_PAGE_SIZE;

pub const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_page_size: Option<u32>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub default_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing or unparsable file gives the defaults. The API URL and the
    /// timeout can be overridden with `CRYPTOWALLET_API_URL` and
    /// `CRYPTOWALLET_TIMEOUT_SECS`.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut config = Self::from_file(dir)?;

        if let Some(url) = env_override("CRYPTOWALLET_API_URL") {
            config.api_base_url = url;
        }
        if let Some(value) = env_override("CRYPTOWALLET_TIMEOUT_SECS") {
            let secs = value
                .parse::<u64>()
                .with_context(|| format!("CRYPTOWALLET_TIMEOUT_SECS is not a number: {}", value))?;
            if secs > 0 {
                config.request_timeout = Duration::from_secs(secs);
            }
        }
        Ok(config)
    }

    /// Settings as written in `settings.json`, without environment overrides
    pub fn from_file(dir: &Path) -> Result<Self> {
        let raw = read_settings(dir)?;
        let defaults = Config::default();

        Ok(Self {
            api_base_url: raw.api_base_url.unwrap_or(defaults.api_base_url),
            request_timeout: raw
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            default_page_size: raw
                .default_page_size
                .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
                .unwrap_or(defaults.default_page_size),
        })
    }

    pub fn set_api_base_url(&mut self, url: &str) -> Result<()> {
        self.api_base_url = normalize_base_url(url)?;
        Ok(())
    }

    pub fn set_request_timeout_secs(&mut self, secs: u64) -> Result<()> {
        if secs == 0 {
            bail!("Request timeout must be at least 1 second");
        }
        self.request_timeout = Duration::from_secs(secs);
        Ok(())
    }

    pub fn set_default_page_size(&mut self, size: u32) -> Result<()> {
        self.default_page_size = offered_page_size(size)?;
        Ok(())
    }

    /// Save config to the data directory, preserving keys we don't manage
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let mut settings = read_settings(dir)?;
        settings.api_base_url = Some(self.api_base_url.clone());
        settings.request_timeout_secs = Some(self.request_timeout.as_secs());
        settings.default_page_size = Some(self.default_page_size);

        let path = dir.join(SETTINGS_FILE);
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

fn read_settings(dir: &Path) -> Result<SettingsFile> {
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
