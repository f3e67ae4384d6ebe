//! CryptoWallet Core - client logic for a custodial multi-currency wallet service
//!
//! This crate implements the client following hexagonal architecture:
//!
//! - **domain**: Entities mirrored from the service (Wallet, Transaction, Page, ...)
//! - **ports**: Trait definitions for the REST backend and local storage
//! - **services**: Client state machines (auth, paginated views, workflows)
//! - **adapters**: Concrete implementations (reqwest client, file store)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::file_store::FileKeyValueStore;
use adapters::http::WalletApiClient;
use config::Config;
use domain::{Admin, Identity, Resource, TransactionsResource, User, UsersResource, Wallet, WalletsResource};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{CryptoCurrency, IdentityKind, Page, SystemStats, Transaction};
pub use services::{LogFormat, init_logging};

/// Main context for wallet client operations
///
/// Holds the configuration, the shared API client and the auth gateway.
/// Views and workflows are created on demand and bound to the signed-in
/// identity.
pub struct WalletContext {
    pub config: Config,
    pub dir: PathBuf,
    pub api: Arc<WalletApiClient>,
    pub auth: AuthGateway,
}

impl WalletContext {
    /// Create a context over `dir`, resuming any persisted session
    pub fn new(dir: &Path) -> Result<Self> {
        let config = Config::load(dir)?;
        Self::with_config(dir, config)
    }

    pub fn with_config(dir: &Path, config: Config) -> Result<Self> {
        let api = Arc::new(
            WalletApiClient::new(&config.api_base_url, config.request_timeout)
                .context("Invalid API base URL")?,
        );
        let store = FileKeyValueStore::new(dir.join("sessions"))
            .with_context(|| format!("Failed to open session store in {}", dir.display()))?;
        let sessions = SessionStore::new(Arc::new(store));

        let mut auth = AuthGateway::new(api.clone(), sessions);
        auth.resume();

        Ok(Self {
            config,
            dir: dir.to_path_buf(),
            api,
            auth,
        })
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.auth.identity()
    }

    /// The signed-in user, or an error telling how to sign in
    pub fn require_user(&self) -> Result<&User> {
        self.auth
            .identity()
            .and_then(Identity::as_user)
            .context("Not logged in as a user. Run 'cw login' first")
    }

    /// The signed-in admin, or an error telling how to sign in
    pub fn require_admin(&self) -> Result<&Admin> {
        self.auth
            .identity()
            .and_then(Identity::as_admin)
            .context("Not logged in as an admin. Run 'cw admin login' first")
    }

    pub fn user_dashboard(&self) -> Result<UserDashboard> {
        let user = self.require_user()?;
        Ok(UserDashboard::new(user.id, self.api.clone(), self.api.clone()))
    }

    pub fn wallet_workflow(&self) -> Result<WalletWorkflow> {
        let user = self.require_user()?;
        Ok(WalletWorkflow::new(self.api.clone(), user.id))
    }

    pub fn composer(&self, wallet: Wallet) -> Result<TransactionComposer> {
        self.require_user()?;
        Ok(TransactionComposer::new(self.api.clone(), wallet)?)
    }

    pub fn history(&self, scope: HistoryScope) -> Result<TransactionHistory> {
        self.require_user()?;
        Ok(TransactionHistory::new(self.api.clone(), scope))
    }

    pub fn users_view(&self) -> Result<PaginatedResourceView<UsersResource>> {
        self.resource_view()
    }

    pub fn wallets_view(&self) -> Result<PaginatedResourceView<WalletsResource>> {
        self.resource_view()
    }

    pub fn transactions_view(&self) -> Result<PaginatedResourceView<TransactionsResource>> {
        self.resource_view()
    }

    pub fn stats_view(&self) -> Result<AdminStatsView> {
        self.require_admin()?;
        Ok(AdminStatsView::new(self.api.clone()))
    }

    pub fn admin_account(&self) -> Result<AdminAccount> {
        let admin = self.require_admin()?.clone();
        Ok(AdminAccount::new(self.api.clone(), admin))
    }

    fn resource_view<R: Resource>(&self) -> Result<PaginatedResourceView<R>> {
        self.require_admin()?;
        let mut view = PaginatedResourceView::new(self.api.clone());
        view.set_size(self.config.default_page_size)?;
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_server::{MockConfig, MockWalletServer};
    use crate::domain::Credentials;
    use tempfile::TempDir;

    fn context(server: &MockWalletServer, dir: &Path) -> WalletContext {
        let config = Config {
            api_base_url: server.base_url(),
            ..Config::default()
        };
        WalletContext::with_config(dir, config).unwrap()
    }

    #[tokio::test]
    async fn test_session_survives_new_context() {
        let server = MockWalletServer::start(MockConfig::default()).unwrap();
        let dir = TempDir::new().unwrap();

        let mut ctx = context(&server, dir.path());
        assert!(ctx.require_user().is_err());
        ctx.auth.login(&Credentials::new("bob", "password456")).await;

        let ctx = context(&server, dir.path());
        assert_eq!(ctx.require_user().unwrap().username, "bob");
        assert!(ctx.require_admin().is_err());
        assert!(ctx.users_view().is_err());
    }

    #[tokio::test]
    async fn test_admin_views_use_configured_page_size() {
        let server = MockWalletServer::start(MockConfig::default()).unwrap();
        let dir = TempDir::new().unwrap();

        let mut ctx = context(&server, dir.path());
        ctx.auth.switch_mode(IdentityKind::Admin);
        ctx.auth.login(&Credentials::new("root", "adminpass1")).await;
        ctx.config.default_page_size = 25;

        let view = ctx.users_view().unwrap();
        assert_eq!(view.size(), 25);
        assert!(ctx.user_dashboard().is_err());
    }
}
