//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod backend;
mod storage;

pub use backend::{
    AdminBackend, AuthBackend, ResourceSource, TransactionBackend, WalletBackend,
};
pub use storage::KeyValueStore;
