//! HTTP middleware components
//!
//! Request correlation and the two credential guards.

pub mod auth;
pub mod request_id;

pub use auth::{constant_time_eq, require_access_key, require_admin_secret};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer};
