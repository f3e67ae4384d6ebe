//! Backend ports - the wallet service's REST contract as traits
//!
//! Services depend only on these traits. The reqwest adapter implements all
//! of them against the real server; tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{
    Admin, AdminProfileUpdate, AdminRegistration, AuthResponse, ChangePassword, Credentials,
    CryptoCurrency, IdentityKind, Page, PageRequest, Registration, Resource, SendTransaction,
    SystemStats, Transaction, Wallet,
};

/// Login and registration for both identity namespaces
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `POST /users/login` or `POST /admin/login`
    ///
    /// Rejections that carry an auth body (400/401) are returned as an
    /// unsuccessful `AuthResponse`, not as an error.
    async fn login(&self, kind: IdentityKind, credentials: &Credentials) -> Result<AuthResponse>;

    /// `POST /users/register` or `POST /admin/register`
    async fn register(&self, registration: &Registration) -> Result<AuthResponse>;
}

/// Wallet operations of the user-facing API
#[async_trait]
pub trait WalletBackend: Send + Sync {
    async fn create_wallet(&self, user_id: i64, currency: CryptoCurrency) -> Result<Wallet>;

    async fn list_wallets(&self, user_id: i64) -> Result<Vec<Wallet>>;

    /// Ask the server to resync a wallet's balance from the chain
    async fn refresh_balance(&self, wallet_id: i64) -> Result<()>;

    async fn deactivate_wallet(&self, wallet_id: i64) -> Result<()>;
}

/// Transaction operations of the user-facing API
#[async_trait]
pub trait TransactionBackend: Send + Sync {
    async fn send_transaction(&self, request: &SendTransaction) -> Result<Transaction>;

    async fn wallet_transactions(&self, wallet_id: i64) -> Result<Vec<Transaction>>;

    async fn user_transactions(&self, user_id: i64) -> Result<Vec<Transaction>>;
}

/// Paged listing, search and row actions for one admin resource
#[async_trait]
pub trait ResourceSource<R: Resource>: Send + Sync {
    /// `GET /admin/dashboard/{resource}` with paging and filters
    async fn list(&self, request: &PageRequest, filters: &R::Filters) -> Result<Page<R::Item>>;

    /// `GET /admin/dashboard/{resource}/search`
    async fn search(&self, query: &str, request: &PageRequest) -> Result<Page<R::Item>>;

    /// `PUT /admin/dashboard/{resource}/{id}/toggle-status`
    async fn toggle_status(&self, id: i64) -> Result<()>;
}

/// Dashboard-wide admin operations outside the resource listings
#[async_trait]
pub trait AdminBackend: Send + Sync {
    async fn stats(&self) -> Result<SystemStats>;

    /// `POST /admin/dashboard/wallets/{id}/refresh-balance`
    async fn refresh_wallet_balance(&self, wallet_id: i64) -> Result<()>;

    async fn users_registered_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<u64>;

    async fn transactions_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<u64>;

    async fn volume_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        currency: CryptoCurrency,
    ) -> Result<Decimal>;

    /// Create another admin account without touching the local session
    async fn register_admin(&self, registration: &AdminRegistration) -> Result<AuthResponse>;

    async fn update_admin(&self, admin_id: i64, update: &AdminProfileUpdate) -> Result<Admin>;

    async fn change_password(&self, admin_id: i64, change: &ChangePassword) -> Result<String>;
}
