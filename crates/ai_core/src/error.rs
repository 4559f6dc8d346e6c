//! Inference errors

use thiserror::Error;

/// Errors that can occur during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Failed to connect to the upstream
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the upstream failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed or required fields were missing
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during inference
    #[error("Inference timeout")]
    Timeout,

    /// Rate limit exceeded upstream
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Upstream answered with a non-success status
    #[error("Server error: status {status}: {body}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Client misconfiguration (e.g. missing credential)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL so query strings never reach logs or callers
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
