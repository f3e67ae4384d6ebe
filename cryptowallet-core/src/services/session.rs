//! Session store - the persisted identity of each namespace

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{Identity, IdentityKind};
use crate::ports::KeyValueStore;

/// Storage key of the persisted identity for `kind`
pub fn session_key(kind: IdentityKind) -> String {
    format!("session.{}", kind.as_str())
}

/// Per-kind persisted identity.
///
/// Reads never fail: unreadable or corrupt records degrade to "logged out",
/// and corrupt records are removed on sight.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, kind: IdentityKind) -> Option<Identity> {
        let key = session_key(kind);
        let raw = match self.store.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e @ Error::Corrupt(_)) => {
                self.discard(kind, &key, &e);
                return None;
            }
            Err(e) => {
                warn!(%kind, error = %e, "failed to read session");
                return None;
            }
        };

        match Identity::from_json(kind, &raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                self.discard(kind, &key, &e);
                None
            }
        }
    }

    fn discard(&self, kind: IdentityKind, key: &str, cause: &dyn std::fmt::Display) {
        debug!(%kind, error = %cause, "discarding corrupt session record");
        if let Err(e) = self.store.remove_item(key) {
            warn!(%kind, error = %e, "failed to remove corrupt session record");
        }
    }

    /// Persist `identity` under its own kind's key
    pub fn set(&self, identity: &Identity) -> Result<()> {
        let json = identity.to_json()?;
        self.store.set_item(&session_key(identity.kind()), &json)
    }

    pub fn clear(&self, kind: IdentityKind) -> Result<()> {
        self.store.remove_item(&session_key(kind))
    }
}
