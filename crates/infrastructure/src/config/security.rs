//! Security configuration: admin secret and credential header names.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Secret that both authorizes `GET /current-key` and seeds key derivation
    /// (sensitive, never serialized)
    #[serde(default, skip_serializing)]
    pub admin_secret: Option<SecretString>,

    /// Header carrying the admin secret
    #[serde(default = "default_admin_header")]
    pub admin_header: String,

    /// Header carrying the weekly access key
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
}

fn default_admin_header() -> String {
    "admin-secret".to_string()
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            admin_secret: None,
            admin_header: default_admin_header(),
            api_key_header: default_api_key_header(),
        }
    }
}
