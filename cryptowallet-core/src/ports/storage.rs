//! Key-value storage port - where local session records live

use crate::domain::result::Result;

/// String-keyed store of small string records
///
/// Implementations must make `set_item` atomic per key: a reader never sees
/// a half-written value.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never set or was removed
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Create or replace a value
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;
}
