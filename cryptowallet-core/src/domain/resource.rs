//! Admin-manageable resource descriptors
//!
//! Users, wallets and transactions share one listing contract on the admin
//! dashboard. Each resource names its path segment, its sortable columns and
//! the filters its list endpoint understands.

use std::fmt::Debug;

use serde::de::DeserializeOwned;

use super::identity::User;
use super::transaction::{Transaction, TransactionStatus, TransactionType};
use super::wallet::{CryptoCurrency, Wallet};

/// Filters forwarded to a resource's list endpoint
pub trait ResourceFilters: Debug + Clone + Default + PartialEq + Send + Sync + 'static {
    /// Query parameters for the set filters, unset ones omitted
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

/// A resource listed by the admin dashboard
pub trait Resource: Send + Sync + 'static {
    type Item: Debug + Clone + DeserializeOwned + Send + Sync + 'static;
    type Filters: ResourceFilters;

    /// Path segment under `/admin/dashboard`
    const PATH: &'static str;
    /// Human-readable plural name
    const LABEL: &'static str;
    const SORT_FIELDS: &'static [&'static str];
    const DEFAULT_SORT: &'static str = "createdAt";
    /// Whether rows can be activated/deactivated
    const TOGGLEABLE: bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilters {
    pub active: Option<bool>,
}

impl ResourceFilters for UserFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.active
            .map(|a| vec![("active", a.to_string())])
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletFilters {
    pub currency: Option<CryptoCurrency>,
    pub active: Option<bool>,
}

impl ResourceFilters for WalletFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(currency) = self.currency {
            pairs.push(("currency", currency.as_str().to_string()));
        }
        if let Some(active) = self.active {
            pairs.push(("active", active.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilters {
    pub status: Option<TransactionStatus>,
    pub direction: Option<TransactionType>,
}

impl ResourceFilters for TransactionFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(direction) = self.direction {
            pairs.push(("type", direction.as_str().to_string()));
        }
        pairs
    }
}

pub struct UsersResource;

impl Resource for UsersResource {
    type Item = User;
    type Filters = UserFilters;

    const PATH: &'static str = "users";
    const LABEL: &'static str = "users";
    const SORT_FIELDS: &'static [&'static str] =
        &["id", "username", "email", "active", "createdAt"];
    const TOGGLEABLE: bool = true;
}

pub struct WalletsResource;

impl Resource for WalletsResource {
    type Item = Wallet;
    type Filters = WalletFilters;

    const PATH: &'static str = "wallets";
    const LABEL: &'static str = "wallets";
    const SORT_FIELDS: &'static [&'static str] =
        &["id", "currency", "balance", "active", "createdAt"];
    const TOGGLEABLE: bool = true;
}

pub struct TransactionsResource;

impl Resource for TransactionsResource {
    type Item = Transaction;
    type Filters = TransactionFilters;

    const PATH: &'static str = "transactions";
    const LABEL: &'static str = "transactions";
    const SORT_FIELDS: &'static [&'static str] =
        &["id", "type", "amount", "status", "createdAt"];
    const TOGGLEABLE: bool = false;
}
