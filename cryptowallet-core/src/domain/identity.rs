//! Identity domain model - users, admins and the auth payloads around them

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::result::Error;
use super::wallet::Wallet;

/// Which identity namespace an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    User,
    Admin,
}

impl IdentityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityKind::User => "user",
            IdentityKind::Admin => "admin",
        }
    }

    /// The opposite namespace
    pub fn other(&self) -> IdentityKind {
        match self {
            IdentityKind::User => IdentityKind::Admin,
            IdentityKind::Admin => IdentityKind::User,
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(IdentityKind::User),
            "admin" => Ok(IdentityKind::Admin),
            other => Err(Error::validation(format!("Unknown mode: {}", other))),
        }
    }
}

/// An end user of the wallet service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    #[serde(default)]
    pub wallets: Option<Vec<Wallet>>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Admin privilege levels, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Moderator,
    Support,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "SUPER_ADMIN",
            AdminRole::Admin => "ADMIN",
            AdminRole::Moderator => "MODERATOR",
            AdminRole::Support => "SUPPORT",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SUPER_ADMIN" => Ok(AdminRole::SuperAdmin),
            "ADMIN" => Ok(AdminRole::Admin),
            "MODERATOR" => Ok(AdminRole::Moderator),
            "SUPPORT" => Ok(AdminRole::Support),
            other => Err(Error::validation(format!("Unknown admin role: {}", other))),
        }
    }
}

/// An operator of the wallet service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: AdminRole,
    pub active: bool,
    #[serde(default)]
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// The locally authenticated principal. Never both at once.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    User(User),
    Admin(Admin),
}

impl Identity {
    pub fn kind(&self) -> IdentityKind {
        match self {
            Identity::User(_) => IdentityKind::User,
            Identity::Admin(_) => IdentityKind::Admin,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Identity::User(u) => u.id,
            Identity::Admin(a) => a.id,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Identity::User(u) => &u.username,
            Identity::Admin(a) => &a.username,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Identity::User(u) => &u.email,
            Identity::Admin(a) => &a.email,
        }
    }

    pub fn display_name(&self) -> String {
        let (first, last) = match self {
            Identity::User(u) => (&u.first_name, &u.last_name),
            Identity::Admin(a) => (&a.first_name, &a.last_name),
        };
        format!("{} {}", first, last).trim().to_string()
    }

    pub fn is_active(&self) -> bool {
        match self {
            Identity::User(u) => u.active,
            Identity::Admin(a) => a.active,
        }
    }

    /// Admin role, `None` for users
    pub fn role(&self) -> Option<AdminRole> {
        match self {
            Identity::User(_) => None,
            Identity::Admin(a) => Some(a.role),
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Identity::User(u) => Some(u),
            Identity::Admin(_) => None,
        }
    }

    pub fn as_admin(&self) -> Option<&Admin> {
        match self {
            Identity::User(_) => None,
            Identity::Admin(a) => Some(a),
        }
    }

    /// Serialize the payload (without the tag) for persistence
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            Identity::User(u) => serde_json::to_string(u),
            Identity::Admin(a) => serde_json::to_string(a),
        }
    }

    /// Parse a persisted payload for the given namespace
    pub fn from_json(kind: IdentityKind, json: &str) -> serde_json::Result<Self> {
        match kind {
            IdentityKind::User => serde_json::from_str(json).map(Identity::User),
            IdentityKind::Admin => serde_json::from_str(json).map(Identity::Admin),
        }
    }
}

/// Username/password pair for either namespace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.username.trim().is_empty() {
            return Err(Error::validation("Username is required"));
        }
        if self.password.is_empty() {
            return Err(Error::validation("Password is required"));
        }
        Ok(())
    }
}

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 8;
/// Maximum password length accepted by the server
pub const MAX_PASSWORD_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: AdminRole,
}

/// Registration payload for either namespace
#[derive(Debug, Clone)]
pub enum Registration {
    User(UserRegistration),
    Admin(AdminRegistration),
}

impl Registration {
    pub fn kind(&self) -> IdentityKind {
        match self {
            Registration::User(_) => IdentityKind::User,
            Registration::Admin(_) => IdentityKind::Admin,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let (username, email, password, first, last) = match self {
            Registration::User(r) => (&r.username, &r.email, &r.password, &r.first_name, &r.last_name),
            Registration::Admin(r) => (&r.username, &r.email, &r.password, &r.first_name, &r.last_name),
        };
        if username.trim().is_empty() {
            return Err(Error::validation("Username is required"));
        }
        if !email.contains('@') {
            return Err(Error::validation("A valid email address is required"));
        }
        validate_password(password)?;
        if first.trim().is_empty() || last.trim().is_empty() {
            return Err(Error::validation("First and last name are required"));
        }
        Ok(())
    }
}

/// Check a new password against the server's length rules
pub fn validate_password(password: &str) -> Result<(), Error> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN || len > MAX_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Wire response of every login/register endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub admin: Option<Admin>,
    #[serde(default)]
    pub success: bool,
}

impl AuthResponse {
    /// Extract the identity for `kind`, or the reason there is none
    pub fn into_identity(self, kind: IdentityKind) -> Result<Identity, String> {
        let failure = || {
            if self.message.trim().is_empty() {
                "Authentication failed".to_string()
            } else {
                self.message.clone()
            }
        };
        if !self.success {
            return Err(failure());
        }
        match kind {
            IdentityKind::User => self.user.clone().map(Identity::User),
            IdentityKind::Admin => self.admin.clone().map(Identity::Admin),
        }
        .ok_or_else(|| format!("Server did not return a {} profile", kind))
    }
}

/// Request body for `POST /admin/{id}/change-password`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

/// Editable admin profile fields for `PUT /admin/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}
