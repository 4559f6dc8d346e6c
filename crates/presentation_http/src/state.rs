//! Application state shared across handlers

use std::sync::Arc;

use application::{ChatService, KeyService, ports::ClockPort};
use axum::http::HeaderName;
use secrecy::SecretString;

/// Header names carrying the two credentials
#[derive(Debug, Clone)]
pub struct CredentialHeaders {
    /// Header compared against the admin secret
    pub admin: HeaderName,
    /// Header compared against the current access key
    pub api_key: HeaderName,
}

impl Default for CredentialHeaders {
    fn default() -> Self {
        Self {
            admin: HeaderName::from_static("admin-secret"),
            api_key: HeaderName::from_static("x-api-key"),
        }
    }
}

impl CredentialHeaders {
    /// Parse configured header names
    pub fn parse(admin: &str, api_key: &str) -> Result<Self, axum::http::header::InvalidHeaderName> {
        Ok(Self {
            admin: HeaderName::from_bytes(admin.as_bytes())?,
            api_key: HeaderName::from_bytes(api_key.as_bytes())?,
        })
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Owner of the weekly access key
    pub key_service: Arc<KeyService>,
    /// Upstream chat proxy
    pub chat_service: Arc<ChatService>,
    /// Operator credential for `GET /current-key`
    pub admin_secret: Arc<SecretString>,
    /// Where each credential is read from
    pub headers: CredentialHeaders,
    /// Same clock the key service reads, for `days_remaining`
    pub clock: Arc<dyn ClockPort>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("key_service", &self.key_service)
            .field("chat_service", &self.chat_service)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
