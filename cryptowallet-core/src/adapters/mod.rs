//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the wallet service backends
//! - JSON files under the data directory for the key-value store
//! - An in-memory key-value store for tests and ephemeral sessions

pub mod file_store;
pub mod http;
pub mod memory_store;

#[cfg(test)]
pub mod mock_server;
