//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    handlers,
    middleware::{RequestIdLayer, require_access_key, require_admin_secret},
    state::AppState,
};

/// Create the router with all routes and their credential guards
pub fn create_router(state: AppState) -> Router {
    let operator = Router::new()
        .route("/current-key", get(handlers::key::current_key))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_secret,
        ));

    let chat = Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_key,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(operator)
        .merge(chat)
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .with_state(state)
}

/// Router plus the cross-cutting layers the server runs with
///
/// The body limit is enforced by the chat handler's body extractor, which
/// answers an oversized request with `payload_too_large`.
pub fn create_app(state: AppState, max_body_bytes: usize) -> Router {
    create_router(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer::new())
}
