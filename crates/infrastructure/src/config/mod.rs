//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `security`: admin secret and credential headers
//! - `key_store`: location of the persisted key record
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file (`config.toml`, or the file named by `KEYGATE_CONFIG`),
//! `KEYGATE_*` environment variables (`__` separates nesting levels) and
//! finally the plain `GROQ_API_KEY`, `ADMIN_SECRET` and `PORT` variables.

mod key_store;
mod security;
mod server;

use std::{collections::HashMap, fmt};

use ai_core::InferenceConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use key_store::KeyStoreConfig;
pub use security::SecurityConfig;
pub use server::{LogFormat, ServerConfig};

/// Prefix of structured environment overrides (`KEYGATE_SERVER__PORT`, ...)
pub const ENV_PREFIX: &str = "KEYGATE";

/// Variable naming an alternative configuration file
pub const CONFIG_FILE_VAR: &str = "KEYGATE_CONFIG";

/// Plain variable carrying the upstream provider credential
pub const UPSTREAM_KEY_VAR: &str = "GROQ_API_KEY";

/// Plain variable carrying the admin secret
pub const ADMIN_SECRET_VAR: &str = "ADMIN_SECRET";

/// Plain variable overriding the listen port
pub const PORT_VAR: &str = "PORT";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Missing required secret: {0}")]
    MissingSecret(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application environment (development or production)
///
/// Controls how much error detail is exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - internal error details are returned
    #[default]
    Development,
    /// Production environment - internal error details are hidden
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Security configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Key record persistence
    #[serde(default)]
    pub key_store: KeyStoreConfig,

    /// Upstream chat-completions provider
    #[serde(default)]
    pub inference: InferenceConfig,
}

impl AppConfig {
    /// Load configuration from the process environment and optional file
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(std::env::vars().collect())
    }

    /// Load configuration from an explicit set of environment variables
    pub fn load_from(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let config_file = vars
            .get(CONFIG_FILE_VAR)
            .cloned()
            .unwrap_or_else(|| "config".to_string());

        let port = vars
            .get(PORT_VAR)
            .map(|p| {
                p.trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::Invalid(format!("{PORT_VAR} is not a valid port: {p}")))
            })
            .transpose()?;

        let env_source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let builder = config::Config::builder()
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g. KEYGATE_SERVER__PORT, KEYGATE_INFERENCE__DEFAULT_MODEL
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env_source)),
            )
            .set_override_option("inference.api_key", vars.get(UPSTREAM_KEY_VAR).cloned())?
            .set_override_option("security.admin_secret", vars.get(ADMIN_SECRET_VAR).cloned())?
            .set_override_option("server.port", port.map(i64::from))?;

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Refuse to run without both secrets
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_present(self.inference.api_key.as_ref()) {
            return Err(ConfigError::MissingSecret(UPSTREAM_KEY_VAR));
        }
        if !is_present(self.security.admin_secret.as_ref()) {
            return Err(ConfigError::MissingSecret(ADMIN_SECRET_VAR));
        }
        for name in [&self.security.admin_header, &self.security.api_key_header] {
            if !is_valid_header_name(name) {
                return Err(ConfigError::Invalid(format!("invalid header name: {name:?}")));
            }
        }
        if self.server.max_body_size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_size_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Admin secret, once `validate` has passed
    pub fn admin_secret(&self) -> Result<SecretString, ConfigError> {
        self.security
            .admin_secret
            .clone()
            .filter(|s| !s.expose_secret().trim().is_empty())
            .ok_or(ConfigError::MissingSecret(ADMIN_SECRET_VAR))
    }

    pub const fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

fn is_present(secret: Option<&SecretString>) -> bool {
    secret.is_some_and(|s| !s.expose_secret().trim().is_empty())
}

fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
