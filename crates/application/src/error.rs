//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Upstream inference call failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Upstream service unreachable or timed out
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Upstream answered with something we could not interpret
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Malformed client input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reading or writing the persisted key record failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
