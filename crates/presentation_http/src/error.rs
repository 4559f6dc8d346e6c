//! API error handling
//!
//! Every error leaves the server as JSON `{error, code, details?}`. In
//! production mode upstream and internal failures return generic messages
//! without details.

use std::sync::atomic::{AtomicBool, Ordering};

use application::ApplicationError;
use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global flag to control error detail exposure
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(true);

/// Configure whether upstream and internal error details are returned to
/// clients. Set to `false` in production.
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found")]
    NotFound,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound => "not_found",
            Self::PayloadTooLarge => "payload_too_large",
            Self::BadGateway(_) => "bad_gateway",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Build the response body, hiding details unless `expose` is set
    pub fn to_body(&self, expose: bool) -> ErrorResponse {
        let (error, details) = match self {
            Self::BadRequest(msg) | Self::Unauthorized(msg) | Self::Forbidden(msg) => {
                (msg.clone(), None)
            },
            Self::NotFound => ("Not Found".to_string(), None),
            Self::PayloadTooLarge => ("Request body too large".to_string(), None),
            Self::BadGateway(msg) => (
                "Upstream service error".to_string(),
                expose.then(|| msg.clone()),
            ),
            Self::ServiceUnavailable(msg) => (
                "Upstream service unavailable".to_string(),
                expose.then(|| msg.clone()),
            ),
            Self::Internal(msg) => (
                "An internal error occurred".to_string(),
                expose.then(|| msg.clone()),
            ),
        };

        ErrorResponse {
            error,
            code: self.code().to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.to_body(should_expose_details());
        (self.status(), Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::InvalidInput(msg) => Self::BadRequest(msg),
            ApplicationError::Inference(msg) | ApplicationError::InvalidResponse(msg) => {
                Self::BadGateway(msg)
            },
            ApplicationError::ExternalService(msg) => Self::ServiceUnavailable(msg),
            ApplicationError::Domain(e) => Self::Internal(e.to_string()),
            ApplicationError::Persistence(msg)
            | ApplicationError::Configuration(msg)
            | ApplicationError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::BadRequest(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized(String::new()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden(String::new()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ApiError::BadGateway(String::new()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::ServiceUnavailable(String::new()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Internal(String::new()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn client_errors_keep_their_message() {
        let body = ApiError::BadRequest("Prompt is required".to_string()).to_body(false);
        assert_eq!(body.error, "Prompt is required");
        assert_eq!(body.code, "bad_request");
        assert!(body.details.is_none());
    }

    #[test]
    fn upstream_details_hidden_when_not_exposed() {
        let err = ApiError::BadGateway("upstream returned status 500: boom".to_string());

        let hidden = err.to_body(false);
        assert_eq!(hidden.error, "Upstream service error");
        assert!(hidden.details.is_none());

        let shown = err.to_body(true);
        assert_eq!(shown.details.as_deref(), Some("upstream returned status 500: boom"));
    }

    #[test]
    fn internal_details_hidden_when_not_exposed() {
        let body = ApiError::Internal("disk on fire".to_string()).to_body(false);
        assert_eq!(body.error, "An internal error occurred");
        assert!(body.details.is_none());
    }

    #[test]
    fn error_response_omits_empty_details() {
        let json = serde_json::to_string(&ApiError::NotFound.to_body(true)).unwrap();
        assert!(json.contains("not_found"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn application_errors_map_to_statuses() {
        let cases = [
            (ApplicationError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (ApplicationError::Inference("x".into()), StatusCode::BAD_GATEWAY),
            (ApplicationError::InvalidResponse("x".into()), StatusCode::BAD_GATEWAY),
            (
                ApplicationError::ExternalService("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ApplicationError::Persistence("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApplicationError::Configuration("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (source, expected) in cases {
            assert_eq!(ApiError::from(source).status(), expected);
        }
    }

    #[test]
    fn payload_too_large_body() {
        let body = ApiError::PayloadTooLarge.to_body(true);
        assert_eq!(body.error, "Request body too large");
        assert_eq!(body.code, "payload_too_large");
        assert!(body.details.is_none());
    }

    #[test]
    fn into_response_sets_status() {
        let response = ApiError::Forbidden("Invalid admin secret".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
