//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::Error;

/// Direction of a transaction relative to the wallet it was listed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Send,
    Receive,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Send => "SEND",
            TransactionType::Receive => "RECEIVE",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            TransactionType::Send => "↗",
            TransactionType::Receive => "↘",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SEND" => Ok(TransactionType::Send),
            "RECEIVE" => Ok(TransactionType::Receive),
            other => Err(Error::validation(format!("Unknown transaction type: {}", other))),
        }
    }
}

/// Server-driven lifecycle of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Coarse visual tone a front-end maps onto its own palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub label: &'static str,
    pub tone: Tone,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 3] = [
        TransactionStatus::Pending,
        TransactionStatus::Confirmed,
        TransactionStatus::Failed,
    ];

    pub fn style(&self) -> StatusStyle {
        match self {
            TransactionStatus::Pending => StatusStyle {
                label: "Pending",
                tone: Tone::Warning,
            },
            TransactionStatus::Confirmed => StatusStyle {
                label: "Confirmed",
                tone: Tone::Success,
            },
            TransactionStatus::Failed => StatusStyle {
                label: "Failed",
                tone: Tone::Danger,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Confirmed => "CONFIRMED",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(TransactionStatus::Pending),
            "CONFIRMED" => Ok(TransactionStatus::Confirmed),
            "FAILED" => Ok(TransactionStatus::Failed),
            other => Err(Error::validation(format!("Unknown transaction status: {}", other))),
        }
    }
}

/// A transaction as reported by the server. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "txHash")]
    pub hash: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: Decimal,
    #[serde(default)]
    pub fee: Option<Decimal>,
    #[serde(rename = "type")]
    pub direction: TransactionType,
    pub status: TransactionStatus,
    #[serde(default)]
    pub block_number: Option<i64>,
    #[serde(default)]
    pub confirmations: Option<i32>,
    #[serde(default)]
    pub memo: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    /// Abbreviated hash for tables
    pub fn short_hash(&self) -> String {
        let chars: Vec<char> = self.hash.chars().collect();
        if chars.len() <= 20 {
            return self.hash.clone();
        }
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 10..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// Request body for `POST /transactions/send`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransaction {
    pub wallet_id: i64,
    pub to_address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}
