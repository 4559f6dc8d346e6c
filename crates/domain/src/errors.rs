//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Access key value does not have the `sk-` + 16 hex format
    #[error("Invalid access key: {0}")]
    InvalidAccessKey(String),
}
