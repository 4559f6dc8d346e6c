//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the file-backed key
//! record, the system clock and the upstream chat-completions adapter.
//! Also owns configuration loading and logging setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{
    AppConfig, ConfigError, Environment, KeyStoreConfig, LogFormat, SecurityConfig, ServerConfig,
};
pub use telemetry::{TelemetryError, init_logging};
