//! System-wide statistics snapshot and the health signals derived from it

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pending transactions at or above this count mark the queue as busy
pub const QUEUE_PRESSURE_THRESHOLD: u64 = 10;

/// Failure share (in percent) at or above which the rate is unhealthy
pub const FAILURE_RATE_ALERT_PERCENT: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub total_users: u64,
    pub active_users: u64,
    pub total_wallets: u64,
    pub bitcoin_wallets: u64,
    pub usdt_wallets: u64,
    pub total_transactions: u64,
    pub pending_transactions: u64,
    pub confirmed_transactions: u64,
    pub failed_transactions: u64,
    pub total_bitcoin_volume: Decimal,
    pub total_usdt_volume: Decimal,
    pub users_registered_today: u64,
    pub transactions_today: u64,
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueuePressure {
    Normal,
    High,
}

impl fmt::Display for QueuePressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueuePressure::Normal => f.write_str("Normal"),
            QueuePressure::High => f.write_str("High"),
        }
    }
}

/// Share of failed transactions.
///
/// `percent` is rounded to two decimals for display; `healthy` is decided
/// on the exact counts. `percent` is `None` when there are no transactions
/// at all, rendered as `0%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FailureRate {
    percent: Option<Decimal>,
    healthy: bool,
}

impl FailureRate {
    fn from_counts(failed: u64, total: u64) -> Self {
        if total == 0 {
            return Self {
                percent: None,
                healthy: true,
            };
        }
        let exact = Decimal::from(failed) / Decimal::from(total) * Decimal::ONE_HUNDRED;
        Self {
            percent: Some(exact.round_dp(2)),
            healthy: u128::from(failed) * 100
                < u128::from(total) * u128::from(FAILURE_RATE_ALERT_PERCENT),
        }
    }

    pub fn percent(&self) -> Decimal {
        self.percent.unwrap_or(Decimal::ZERO)
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }
}

impl fmt::Display for FailureRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent {
            Some(p) => write!(f, "{:.2}%", p),
            None => f.write_str("0%"),
        }
    }
}

/// Health signals shown next to the statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSignals {
    pub queue_pressure: QueuePressure,
    pub failure_rate: FailureRate,
}

impl SystemStats {
    pub fn queue_pressure(&self) -> QueuePressure {
        if self.pending_transactions >= QUEUE_PRESSURE_THRESHOLD {
            QueuePressure::High
        } else {
            QueuePressure::Normal
        }
    }

    pub fn failure_rate(&self) -> FailureRate {
        FailureRate::from_counts(self.failed_transactions, self.total_transactions)
    }

    /// Always recomputed from the snapshot fields
    pub fn health(&self) -> HealthSignals {
        HealthSignals {
            queue_pressure: self.queue_pressure(),
            failure_rate: self.failure_rate(),
        }
    }
}
