//! Admin account settings - profile, password and new admins

use std::sync::Arc;

use tracing::info;

use crate::domain::result::{Error, Result};
use crate::domain::{
    validate_password, Admin, AdminProfileUpdate, AdminRegistration, AdminRole, ChangePassword,
    IdentityKind, Registration,
};
use crate::ports::AdminBackend;

pub struct AdminAccount {
    backend: Arc<dyn AdminBackend>,
    admin: Admin,
}

impl AdminAccount {
    pub fn new(backend: Arc<dyn AdminBackend>, admin: Admin) -> Self {
        Self { backend, admin }
    }

    pub fn admin(&self) -> &Admin {
        &self.admin
    }

    pub async fn update_profile(&mut self, update: &AdminProfileUpdate) -> Result<&Admin> {
        if update.email.is_none() && update.first_name.is_none() && update.last_name.is_none() {
            return Err(Error::validation("Nothing to update"));
        }
        if update.email.as_deref().is_some_and(|e| !e.contains('@')) {
            return Err(Error::validation("A valid email address is required"));
        }
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&update.first_name) || blank(&update.last_name) {
            return Err(Error::validation("First and last name cannot be blank"));
        }

        let updated = self.backend.update_admin(self.admin.id, update).await?;
        info!(admin_id = updated.id, "updated admin profile");
        self.admin = updated;
        Ok(&self.admin)
    }

    /// Returns the server's confirmation text
    pub async fn change_password(&self, current: &str, new: &str) -> Result<String> {
        if current.is_empty() {
            return Err(Error::validation("Current password is required"));
        }
        validate_password(new)?;
        let change = ChangePassword {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        let message = self.backend.change_password(self.admin.id, &change).await?;
        info!(admin_id = self.admin.id, "changed admin password");
        Ok(message)
    }

    /// Create another admin; the local session is left alone
    pub async fn register_admin(&self, registration: &AdminRegistration) -> Result<Admin> {
        if self.admin.role != AdminRole::SuperAdmin {
            return Err(Error::validation("Only super admins can create admin accounts"));
        }
        Registration::Admin(registration.clone()).validate()?;

        let response = self.backend.register_admin(registration).await?;
        let identity = response
            .into_identity(IdentityKind::Admin)
            .map_err(|reason| Error::remote(400, reason))?;
        let created = identity
            .as_admin()
            .cloned()
            .ok_or_else(|| Error::InvalidResponse("registration returned no admin".to_string()))?;
        info!(admin_id = created.id, role = %created.role, "created admin");
        Ok(created)
    }
}
