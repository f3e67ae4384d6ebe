//! Wallet domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::Error;

/// Currencies the custodial service can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CryptoCurrency {
    Bitcoin,
    UsdtTrc20,
}

/// Display metadata for a currency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    /// Ticker shown next to amounts
    pub symbol: &'static str,
    pub name: &'static str,
    /// Decimal places used when rendering amounts
    pub decimals: u32,
}

impl CryptoCurrency {
    pub const ALL: [CryptoCurrency; 2] = [CryptoCurrency::Bitcoin, CryptoCurrency::UsdtTrc20];

    pub fn info(&self) -> CurrencyInfo {
        match self {
            CryptoCurrency::Bitcoin => CurrencyInfo {
                symbol: "BTC",
                name: "Bitcoin",
                decimals: 8,
            },
            CryptoCurrency::UsdtTrc20 => CurrencyInfo {
                symbol: "USDT",
                name: "Tether (TRC-20)",
                decimals: 2,
            },
        }
    }

    /// Wire name used in query parameters and JSON bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoCurrency::Bitcoin => "BITCOIN",
            CryptoCurrency::UsdtTrc20 => "USDT_TRC20",
        }
    }

    /// Format an amount with this currency's precision and ticker
    pub fn format_amount(&self, amount: Decimal) -> String {
        let info = self.info();
        format!("{:.*} {}", info.decimals as usize, amount, info.symbol)
    }
}

impl fmt::Display for CryptoCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptoCurrency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BITCOIN" | "BTC" => Ok(CryptoCurrency::Bitcoin),
            "USDT_TRC20" | "USDT" => Ok(CryptoCurrency::UsdtTrc20),
            other => Err(Error::validation(format!("Unknown currency: {}", other))),
        }
    }
}

/// A custodial wallet owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: i64,
    /// Opaque on-chain address issued by the server
    pub address: String,
    pub currency: CryptoCurrency,
    pub balance: Decimal,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Wallet {
    /// Abbreviate long addresses as `head...tail`
    pub fn short_address(&self, keep: usize) -> String {
        let chars: Vec<char> = self.address.chars().collect();
        if chars.len() <= keep * 2 {
            return self.address.clone();
        }
        let head: String = chars[..keep].iter().collect();
        let tail: String = chars[chars.len() - keep..].iter().collect();
        format!("{}...{}", head, tail)
    }

    pub fn formatted_balance(&self) -> String {
        self.currency.format_amount(self.balance)
    }
}

/// Request body for wallet creation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalletCreation {
    pub currency: CryptoCurrency,
}
