//! Operator key endpoint

use axum::{Json, extract::State};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::state::AppState;

/// Current key response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentKeyResponse {
    pub api_key: String,
    pub expiry: String,
    pub days_remaining: i64,
}

/// Return the current access key, rotating it first if it has expired
///
/// Guarded by the admin secret.
#[instrument(skip(state))]
pub async fn current_key(State(state): State<AppState>) -> Json<CurrentKeyResponse> {
    let key = state.key_service.current_or_refresh().await;
    let now = state.clock.now();

    info!(expiry = %key.expiry(), "Access key handed to operator");

    Json(CurrentKeyResponse {
        api_key: key.value().to_string(),
        expiry: key.expiry().to_rfc3339_opts(SecondsFormat::Micros, true),
        days_remaining: key.days_remaining(now),
    })
}
