//! Credential guards
//!
//! Two route-level guards, installed with `from_fn_with_state`:
//! - [`require_admin_secret`] protects the operator endpoint (`403` on mismatch)
//! - [`require_access_key`] protects the chat endpoint (`401` on mismatch)
//!
//! Both compare in constant time. A rejected request never reaches its
//! handler, so no upstream call is made and no state changes.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::{error::ApiError, state::AppState};

/// Constant-time string comparison
///
/// Only the length comparison can short-circuit.
#[inline]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &axum::http::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Reject unless the admin header matches the admin secret byte-for-byte
pub async fn require_admin_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = header_value(request.headers(), &state.headers.admin);

    match provided {
        Some(value) if constant_time_eq(value, state.admin_secret.expose_secret()) => {
            next.run(request).await
        },
        Some(_) => {
            warn!("Rejected request with invalid admin secret");
            ApiError::Forbidden("Invalid admin secret".to_string()).into_response()
        },
        None => {
            debug!(header = %state.headers.admin, "Admin secret header missing");
            ApiError::Forbidden("Invalid admin secret".to_string()).into_response()
        },
    }
}

/// Reject unless the access key header matches the current weekly key
///
/// The comparison uses `current_or_refresh`, so an expired key rotates here
/// even if no operator has fetched the new one yet.
pub async fn require_access_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(provided) = header_value(request.headers(), &state.headers.api_key)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
    else {
        debug!(header = %state.headers.api_key, "Access key header missing");
        return ApiError::Unauthorized("Invalid or expired API key".to_string()).into_response();
    };

    let current = state.key_service.current_or_refresh().await;
    if constant_time_eq(&provided, current.value()) {
        next.run(request).await
    } else {
        warn!("Rejected request with invalid or expired access key");
        ApiError::Unauthorized("Invalid or expired API key".to_string()).into_response()
    }
}
