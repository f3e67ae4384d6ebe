//! Auth gateway - login, registration and the current identity
//!
//! The gateway owns the single in-memory identity slot and the current mode.
//! User and admin sessions are mutually exclusive: entering one mode wipes the
//! other mode's identity from memory and from the session store.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{AuthResponse, Credentials, Identity, IdentityKind, Registration};
use crate::ports::AuthBackend;
use crate::services::session::SessionStore;

/// Result of a login or registration attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Authenticated(Identity),
    /// Human-readable reason, never an error value
    Rejected(String),
}

impl AuthOutcome {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthOutcome::Authenticated(identity) => Some(identity),
            AuthOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&str> {
        match self {
            AuthOutcome::Authenticated(_) => None,
            AuthOutcome::Rejected(reason) => Some(reason),
        }
    }
}

pub struct AuthGateway {
    backend: Arc<dyn AuthBackend>,
    sessions: SessionStore,
    mode: IdentityKind,
    identity: Option<Identity>,
}

impl AuthGateway {
    /// Create a gateway in user mode with nothing loaded yet
    pub fn new(backend: Arc<dyn AuthBackend>, sessions: SessionStore) -> Self {
        Self {
            backend,
            sessions,
            mode: IdentityKind::User,
            identity: None,
        }
    }

    pub fn mode(&self) -> IdentityKind {
        self.mode
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Load the persisted identity of the current mode
    pub fn restore(&mut self) -> Option<&Identity> {
        self.identity = self.sessions.get(self.mode);
        self.identity.as_ref()
    }

    /// Pick up whichever session survived a restart.
    ///
    /// Only one kind is ever persisted, so adopting the other kind's mode
    /// here never discards anything.
    pub fn resume(&mut self) -> Option<&Identity> {
        if self.sessions.get(self.mode).is_none() {
            let other = self.mode.other();
            if self.sessions.get(other).is_some() {
                self.mode = other;
            }
        }
        self.restore()
    }

    /// Enter `kind`, wiping the other mode's identity first
    pub fn switch_mode(&mut self, kind: IdentityKind) -> Option<&Identity> {
        if kind != self.mode {
            let previous = self.mode;
            self.identity = None;
            if let Err(e) = self.sessions.clear(previous) {
                warn!(kind = %previous, error = %e, "failed to clear session on mode switch");
            }
            self.mode = kind;
            info!(from = %previous, to = %kind, "switched mode");
        }
        self.restore()
    }

    pub async fn login(&mut self, credentials: &Credentials) -> AuthOutcome {
        if let Err(e) = credentials.validate() {
            return AuthOutcome::Rejected(e.user_message());
        }
        let response = self.backend.login(self.mode, credentials).await;
        self.complete(response)
    }

    /// Register and sign in; the payload's kind must match the current mode
    pub async fn register(&mut self, registration: &Registration) -> AuthOutcome {
        if registration.kind() != self.mode {
            return AuthOutcome::Rejected(format!(
                "Cannot register a {} account while in {} mode",
                registration.kind(),
                self.mode
            ));
        }
        if let Err(e) = registration.validate() {
            return AuthOutcome::Rejected(e.user_message());
        }
        let response = self.backend.register(registration).await;
        self.complete(response)
    }

    /// Replace the stored identity after a profile change on the server
    pub fn refresh_identity(&mut self, identity: Identity) -> Result<()> {
        let matches = self
            .identity
            .as_ref()
            .is_some_and(|current| current.kind() == identity.kind() && current.id() == identity.id());
        if !matches {
            return Err(Error::validation("Updated profile does not belong to the signed-in account"));
        }
        self.sessions.set(&identity)?;
        self.identity = Some(identity);
        Ok(())
    }

    /// Forget both identities; mode falls back to user
    pub fn logout(&mut self) -> Result<()> {
        self.identity = None;
        self.mode = IdentityKind::User;
        let user = self.sessions.clear(IdentityKind::User);
        let admin = self.sessions.clear(IdentityKind::Admin);
        info!("logged out");
        user.and(admin)
    }

    fn complete(&mut self, response: Result<AuthResponse>) -> AuthOutcome {
        let identity = match response {
            Ok(response) => match response.into_identity(self.mode) {
                Ok(identity) => identity,
                Err(reason) => return AuthOutcome::Rejected(reason),
            },
            Err(e) => return AuthOutcome::Rejected(e.user_message()),
        };

        if let Err(e) = self.sessions.clear(self.mode.other()) {
            warn!(error = %e, "failed to clear the other mode's session");
        }
        if let Err(e) = self.sessions.set(&identity) {
            warn!(error = %e, "failed to persist session");
        }
        info!(kind = %identity.kind(), username = identity.username(), "authenticated");
        self.identity = Some(identity.clone());
        AuthOutcome::Authenticated(identity)
    }
}
