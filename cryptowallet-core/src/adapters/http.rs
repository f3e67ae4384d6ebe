//! Wallet service HTTP client
//!
//! Talks JSON to the wallet service's REST API. One client serves both the
//! user-facing endpoints (`/users`, `/wallets`, `/transactions`) and the
//! admin namespace (`/admin/...`), and implements every backend port.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Admin, AdminProfileUpdate, AdminRegistration, AuthResponse, ChangePassword, Credentials,
    CryptoCurrency, IdentityKind, Page, PageRequest, Registration, Resource, ResourceFilters,
    SendTransaction, SystemStats, Transaction, Wallet, WalletCreation,
};
use crate::ports::{
    AdminBackend, AuthBackend, ResourceSource, TransactionBackend, WalletBackend,
};

/// Default API root of a locally running wallet service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Query-string timestamp format understood by the analytics endpoints
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Error body shape used by the service (`{"message": "..."}`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Wallet service API client
#[derive(Debug, Clone)]
pub struct WalletApiClient {
    client: Client,
    base_url: String,
}

/// Trim a base URL and check that it is an absolute http(s) URL
pub fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "API base URL must use http or https, got '{}'",
            parsed.scheme()
        )));
    }
    Ok(trimmed.to_string())
}

impl WalletApiClient {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json")
    }

    /// Send a request, mapping transport errors and non-2xx statuses
    async fn execute(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| self.map_request_error(e))?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "wallet api response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(%method, path, status = status.as_u16(), %message, "wallet api request failed");
        Err(Error::remote(status.as_u16(), message))
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(|e| {
            Error::Network(format!("Failed to read response from {}: {}", path, e))
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::InvalidResponse(format!("Unexpected response from {}: {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let builder = self.request(Method::GET, path).query(query);
        let response = self.execute(Method::GET, path, builder).await?;
        Self::decode(path, response).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.execute(method, path, builder).await?;
        Self::decode(path, response).await
    }

    /// Fire a request whose response body is irrelevant
    async fn send_empty(&self, method: Method, path: &str) -> Result<()> {
        let builder = self.request(method.clone(), path);
        self.execute(method, path, builder).await?;
        Ok(())
    }

    /// Auth endpoints answer rejections with an `AuthResponse` body
    async fn post_auth<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<AuthResponse> {
        let builder = self.request(Method::POST, path).json(body);
        let response = builder.send().await.map_err(|e| self.map_request_error(e))?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "wallet api auth response");

        if status.is_success() {
            return Self::decode(path, response).await;
        }

        let text = response.text().await.unwrap_or_default();
        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
            if let Ok(auth) = serde_json::from_str::<AuthResponse>(&text) {
                return Ok(AuthResponse {
                    success: false,
                    ..auth
                });
            }
        }
        Err(Error::remote(status.as_u16(), error_message(status, &text)))
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Network("Request to the wallet service timed out".to_string())
        } else if error.is_connect() {
            Error::Network(format!("Unable to connect to the wallet service at {}", self.base_url))
        } else {
            Error::Network(format!("Wallet service request failed: {}", error))
        }
    }

    fn auth_prefix(kind: IdentityKind) -> &'static str {
        match kind {
            IdentityKind::User => "/users",
            IdentityKind::Admin => "/admin",
        }
    }

    fn period_params(start: NaiveDateTime, end: NaiveDateTime) -> Vec<(&'static str, String)> {
        vec![
            ("start", start.format(DATE_TIME_FORMAT).to_string()),
            ("end", end.format(DATE_TIME_FORMAT).to_string()),
        ]
    }
}

/// Pick the most useful message out of an error response
fn error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
        if let Some(msg) = parsed.message.or(parsed.error).filter(|m| !m.trim().is_empty()) {
            return msg;
        }
    }
    // Plain-text bodies (e.g. password change) are short human messages
    if !trimmed.is_empty() && !trimmed.starts_with('{') && !trimmed.starts_with('<') && trimmed.len() <= 200 {
        return trimmed.to_string();
    }
    match status {
        StatusCode::BAD_REQUEST => "The wallet service rejected the request".to_string(),
        StatusCode::UNAUTHORIZED => "Authentication failed".to_string(),
        StatusCode::FORBIDDEN => "Access denied".to_string(),
        StatusCode::NOT_FOUND => "Resource not found".to_string(),
        s if s.is_server_error() => format!("Wallet service error: HTTP {}", s.as_u16()),
        s => format!("Unexpected response: HTTP {}", s.as_u16()),
    }
}

#[async_trait]
impl AuthBackend for WalletApiClient {
    async fn login(&self, kind: IdentityKind, credentials: &Credentials) -> Result<AuthResponse> {
        let path = format!("{}/login", Self::auth_prefix(kind));
        self.post_auth(&path, credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        let path = format!("{}/register", Self::auth_prefix(registration.kind()));
        match registration {
            Registration::User(body) => self.post_auth(&path, body).await,
            Registration::Admin(body) => self.post_auth(&path, body).await,
        }
    }
}

#[async_trait]
impl WalletBackend for WalletApiClient {
    async fn create_wallet(&self, user_id: i64, currency: CryptoCurrency) -> Result<Wallet> {
        let path = format!("/wallets/user/{}", user_id);
        self.send_json(Method::POST, &path, Some(&WalletCreation { currency }))
            .await
    }

    async fn list_wallets(&self, user_id: i64) -> Result<Vec<Wallet>> {
        self.get_json(&format!("/wallets/user/{}", user_id), &[]).await
    }

    async fn refresh_balance(&self, wallet_id: i64) -> Result<()> {
        self.send_empty(Method::POST, &format!("/wallets/{}/refresh-balance", wallet_id))
            .await
    }

    async fn deactivate_wallet(&self, wallet_id: i64) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/wallets/{}", wallet_id))
            .await
    }
}

#[async_trait]
impl TransactionBackend for WalletApiClient {
    async fn send_transaction(&self, request: &SendTransaction) -> Result<Transaction> {
        self.send_json(Method::POST, "/transactions/send", Some(request))
            .await
    }

    async fn wallet_transactions(&self, wallet_id: i64) -> Result<Vec<Transaction>> {
        self.get_json(&format!("/transactions/wallet/{}", wallet_id), &[])
            .await
    }

    async fn user_transactions(&self, user_id: i64) -> Result<Vec<Transaction>> {
        self.get_json(&format!("/transactions/user/{}", user_id), &[])
            .await
    }
}

#[async_trait]
impl<R: Resource> ResourceSource<R> for WalletApiClient {
    async fn list(&self, request: &PageRequest, filters: &R::Filters) -> Result<Page<R::Item>> {
        let path = format!("/admin/dashboard/{}", R::PATH);
        let mut query = request.query_pairs();
        query.extend(filters.query_pairs());
        self.get_json(&path, &query).await
    }

    async fn search(&self, query: &str, request: &PageRequest) -> Result<Page<R::Item>> {
        let path = format!("/admin/dashboard/{}/search", R::PATH);
        let mut params = vec![("query", query.to_string())];
        params.extend(request.query_pairs());
        self.get_json(&path, &params).await
    }

    async fn toggle_status(&self, id: i64) -> Result<()> {
        let path = format!("/admin/dashboard/{}/{}/toggle-status", R::PATH, id);
        self.send_empty(Method::PUT, &path).await
    }
}

#[async_trait]
impl AdminBackend for WalletApiClient {
    async fn stats(&self) -> Result<SystemStats> {
        self.get_json("/admin/dashboard/stats", &[]).await
    }

    async fn refresh_wallet_balance(&self, wallet_id: i64) -> Result<()> {
        let path = format!("/admin/dashboard/wallets/{}/refresh-balance", wallet_id);
        self.send_empty(Method::POST, &path).await
    }

    async fn users_registered_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<u64> {
        self.get_json(
            "/admin/dashboard/analytics/users-registered",
            &Self::period_params(start, end),
        )
        .await
    }

    async fn transactions_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<u64> {
        self.get_json(
            "/admin/dashboard/analytics/transactions",
            &Self::period_params(start, end),
        )
        .await
    }

    async fn volume_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        currency: CryptoCurrency,
    ) -> Result<Decimal> {
        let mut params = Self::period_params(start, end);
        params.push(("currency", currency.as_str().to_string()));
        self.get_json("/admin/dashboard/analytics/volume", &params)
            .await
    }

    async fn register_admin(&self, registration: &AdminRegistration) -> Result<AuthResponse> {
        self.post_auth("/admin/register", registration).await
    }

    async fn update_admin(&self, admin_id: i64, update: &AdminProfileUpdate) -> Result<Admin> {
        self.send_json(Method::PUT, &format!("/admin/{}", admin_id), Some(update))
            .await
    }

    async fn change_password(&self, admin_id: i64, change: &ChangePassword) -> Result<String> {
        let path = format!("/admin/{}/change-password", admin_id);
        let builder = self.request(Method::POST, &path).json(change);
        let response = self.execute(Method::POST, &path, builder).await?;
        // Plain-text confirmation, not JSON
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response from {}: {}", path, e)))?;
        Ok(text.trim().trim_matches('"').to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
