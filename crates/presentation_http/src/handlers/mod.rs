//! HTTP request handlers

pub mod chat;
pub mod health;
pub mod key;

use crate::error::ApiError;

/// Fallback for unknown paths and unsupported methods
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
