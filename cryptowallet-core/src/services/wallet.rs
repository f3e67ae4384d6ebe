//! Wallet workflow - a user's wallet list and the mutations on it

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{CryptoCurrency, Wallet};
use crate::ports::WalletBackend;
use crate::services::fence::RequestFence;

/// Outcome of a mutation followed by a list reload.
///
/// The mutation succeeded; `reload_error` reports a failure of the reload
/// that followed, which leaves the list stale but does not undo anything.
#[derive(Debug)]
pub struct Reloaded<T> {
    pub value: T,
    pub reload_error: Option<Error>,
}

impl<T> Reloaded<T> {
    pub fn is_fresh(&self) -> bool {
        self.reload_error.is_none()
    }
}

pub struct WalletWorkflow {
    backend: Arc<dyn WalletBackend>,
    user_id: i64,
    wallets: Vec<Wallet>,
    selected: Option<i64>,
    error: Option<String>,
    fence: RequestFence,
}

impl WalletWorkflow {
    pub fn new(backend: Arc<dyn WalletBackend>, user_id: i64) -> Self {
        Self {
            backend,
            user_id,
            wallets: Vec::new(),
            selected: None,
            error: None,
            fence: RequestFence::new(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn wallet(&self, wallet_id: i64) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.id == wallet_id)
    }

    pub fn selected(&self) -> Option<&Wallet> {
        self.selected.and_then(|id| self.wallet(id))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Re-fetch the owner's wallets, replacing the list
    pub async fn load(&mut self) -> Result<&[Wallet]> {
        let ticket = self.fence.issue();
        let result = self.backend.list_wallets(self.user_id).await;
        if !self.fence.is_current(ticket) {
            debug!(user_id = self.user_id, "discarding stale wallet list");
            return Ok(&self.wallets);
        }
        match result {
            Ok(wallets) => {
                self.wallets = wallets;
                self.error = None;
                // A selection must keep pointing at a listed, active wallet
                if self.selected().map_or(true, |w| !w.active) {
                    self.selected = None;
                }
                Ok(&self.wallets)
            }
            Err(e) => {
                warn!(user_id = self.user_id, error = %e, "failed to load wallets");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub async fn create(&mut self, currency: CryptoCurrency) -> Result<Reloaded<Wallet>> {
        let backend = self.backend.clone();
        let wallet = self.mutate(backend.create_wallet(self.user_id, currency)).await?;
        info!(wallet_id = wallet.id, %currency, "created wallet");
        Ok(self.reload(wallet).await)
    }

    /// Ask the server to resync a balance, then reload
    pub async fn refresh_balance(&mut self, wallet_id: i64) -> Result<Reloaded<()>> {
        let backend = self.backend.clone();
        self.mutate(backend.refresh_balance(wallet_id)).await?;
        Ok(self.reload(()).await)
    }

    pub async fn deactivate(&mut self, wallet_id: i64) -> Result<Reloaded<()>> {
        let backend = self.backend.clone();
        self.mutate(backend.deactivate_wallet(wallet_id)).await?;
        info!(wallet_id, "deactivated wallet");
        Ok(self.reload(()).await)
    }

    /// Choose the wallet to send from; only listed, active wallets qualify
    pub fn select(&mut self, wallet_id: i64) -> Result<&Wallet> {
        let wallet = self
            .wallets
            .iter()
            .find(|w| w.id == wallet_id)
            .ok_or_else(|| Error::validation(format!("Wallet {} is not in the list", wallet_id)))?;
        if !wallet.active {
            return Err(Error::validation("Inactive wallets cannot send funds"));
        }
        self.selected = Some(wallet_id);
        Ok(wallet)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    async fn mutate<T>(&mut self, call: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        match call.await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    async fn reload<T>(&mut self, value: T) -> Reloaded<T> {
        let reload_error = self.load().await.err();
        Reloaded { value, reload_error }
    }
}
