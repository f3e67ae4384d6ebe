//! Admin statistics view and on-demand analytics

use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{CryptoCurrency, HealthSignals, SystemStats};
use crate::ports::AdminBackend;
use crate::services::fence::RequestFence;

/// System-wide snapshot, fetched on activation and on explicit refresh only
pub struct AdminStatsView {
    backend: Arc<dyn AdminBackend>,
    stats: Option<SystemStats>,
    error: Option<String>,
    fence: RequestFence,
}

impl AdminStatsView {
    pub fn new(backend: Arc<dyn AdminBackend>) -> Self {
        Self {
            backend,
            stats: None,
            error: None,
            fence: RequestFence::new(),
        }
    }

    pub fn stats(&self) -> Option<&SystemStats> {
        self.stats.as_ref()
    }

    /// Derived from the current snapshot every time
    pub fn health(&self) -> Option<HealthSignals> {
        self.stats.as_ref().map(SystemStats::health)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch once; later activations reuse the snapshot
    pub async fn activate(&mut self) -> Result<&SystemStats> {
        if self.stats.is_none() {
            self.refresh().await?;
        }
        self.stats
            .as_ref()
            .ok_or_else(|| Error::Other("statistics not loaded".to_string()))
    }

    pub async fn refresh(&mut self) -> Result<&SystemStats> {
        let ticket = self.fence.issue();
        let result = self.backend.stats().await;
        if !self.fence.is_current(ticket) {
            debug!("discarding stale statistics");
        } else {
            match result {
                Ok(stats) => {
                    self.stats = Some(stats);
                    self.error = None;
                }
                Err(e) => {
                    warn!(error = %e, "failed to load statistics");
                    self.error = Some(e.user_message());
                    return Err(e);
                }
            }
        }
        self.stats
            .as_ref()
            .ok_or_else(|| Error::Other("statistics not loaded".to_string()))
    }

    /// Counts and per-currency volume within `[start, end]`
    pub async fn analytics(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<AnalyticsReport> {
        if start > end {
            return Err(Error::validation("Period start must not be after its end"));
        }
        let users_registered = self.backend.users_registered_between(start, end).await?;
        let transactions = self.backend.transactions_between(start, end).await?;

        let mut volume = Vec::with_capacity(CryptoCurrency::ALL.len());
        for currency in CryptoCurrency::ALL {
            let amount = self.backend.volume_between(start, end, currency).await?;
            volume.push(CurrencyVolume { currency, amount });
        }

        Ok(AnalyticsReport {
            start,
            end,
            users_registered,
            transactions,
            volume,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyVolume {
    pub currency: CryptoCurrency,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub users_registered: u64,
    pub transactions: u64,
    pub volume: Vec<CurrencyVolume>,
}
