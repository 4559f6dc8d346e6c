//! KeyGate HTTP presentation layer
//!
//! This crate provides the HTTP API: health, the operator key endpoint and
//! the key-guarded chat proxy.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use middleware::{RequestId, RequestIdLayer};
pub use routes::{create_app, create_router};
pub use state::{AppState, CredentialHeaders};
