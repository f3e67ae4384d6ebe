//! Core domain entities
//!
//! All entities mirrored from the wallet service are defined here. These are
//! pure data structures with validation logic - no I/O.

mod identity;
pub mod page;
pub mod resource;
pub mod result;
mod stats;
mod transaction;
mod wallet;

pub use identity::{
    validate_password, Admin, AdminProfileUpdate, AdminRegistration, AdminRole, AuthResponse,
    ChangePassword, Credentials, Identity, IdentityKind, Registration, User, UserRegistration,
};
pub use page::{offered_page_size, page_window, Page, PageRequest, SortDirection};
pub use resource::{
    Resource, ResourceFilters, TransactionFilters, TransactionsResource, UserFilters,
    UsersResource, WalletFilters, WalletsResource,
};
pub use stats::{FailureRate, HealthSignals, QueuePressure, SystemStats};
pub use transaction::{
    SendTransaction, StatusStyle, Tone, Transaction, TransactionStatus, TransactionType,
};
pub use wallet::{CryptoCurrency, CurrencyInfo, Wallet, WalletCreation};
