//! User dashboard - which panel is showing and what it is bound to

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::Transaction;
use crate::ports::{TransactionBackend, WalletBackend};
use crate::services::transaction::{HistoryScope, TransactionComposer, TransactionHistory};
use crate::services::wallet::{Reloaded, WalletWorkflow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    #[default]
    Wallets,
    /// Only reachable with a selected wallet
    Send,
    History,
}

pub struct UserDashboard {
    tab: DashboardTab,
    transactions: Arc<dyn TransactionBackend>,
    wallets: WalletWorkflow,
    composer: Option<TransactionComposer>,
    history: TransactionHistory,
}

impl UserDashboard {
    pub fn new(
        user_id: i64,
        wallets: Arc<dyn WalletBackend>,
        transactions: Arc<dyn TransactionBackend>,
    ) -> Self {
        Self {
            tab: DashboardTab::Wallets,
            wallets: WalletWorkflow::new(wallets, user_id),
            history: TransactionHistory::new(transactions.clone(), HistoryScope::User(user_id)),
            transactions,
            composer: None,
        }
    }

    pub fn tab(&self) -> DashboardTab {
        self.tab
    }

    pub fn wallets(&self) -> &WalletWorkflow {
        &self.wallets
    }

    pub fn wallets_mut(&mut self) -> &mut WalletWorkflow {
        &mut self.wallets
    }

    pub fn composer(&self) -> Option<&TransactionComposer> {
        self.composer.as_ref()
    }

    pub fn composer_mut(&mut self) -> Option<&mut TransactionComposer> {
        self.composer.as_mut()
    }

    pub fn history(&self) -> &TransactionHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut TransactionHistory {
        &mut self.history
    }

    /// Pick a wallet and open the send panel for it
    pub fn select_wallet(&mut self, wallet_id: i64) -> Result<&mut TransactionComposer> {
        let wallet = self.wallets.select(wallet_id)?.clone();
        let composer = TransactionComposer::new(self.transactions.clone(), wallet)?;
        self.tab = DashboardTab::Send;
        Ok(self.composer.insert(composer))
    }

    pub fn show_wallets(&mut self) {
        self.tab = DashboardTab::Wallets;
        self.composer = None;
        self.wallets.clear_selection();
    }

    pub fn show_history(&mut self) {
        self.tab = DashboardTab::History;
    }

    /// Submit the open draft; on success return to the refreshed wallet list
    pub async fn submit_send(&mut self) -> Result<Reloaded<Transaction>> {
        let composer = self
            .composer
            .as_mut()
            .ok_or_else(|| Error::validation("Select a wallet before sending"))?;
        let tx = composer.submit().await?;
        self.show_wallets();
        let reload_error = self.wallets.load().await.err();
        Ok(Reloaded {
            value: tx,
            reload_error,
        })
    }
}
