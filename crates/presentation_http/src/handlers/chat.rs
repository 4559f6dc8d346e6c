//! Chat proxy handler
//!
//! Accepts the prompt as `application/x-www-form-urlencoded` (`prompt=...`)
//! or `application/json` (`{"prompt": "..."}`). Content types are matched by
//! substring so parameters such as `charset` are tolerated.

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, header::CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Chat response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant response; `null` when the upstream sent no content
    pub response: Option<String>,
    /// Model reported by the upstream
    pub model: String,
    /// Upstream token usage, relayed as-is
    pub usage: serde_json::Value,
}

/// Pull the prompt out of a form or JSON body
///
/// A missing prompt yields an empty string; emptiness is rejected later.
pub fn extract_prompt(content_type: &str, body: &[u8]) -> Result<String, ApiError> {
    if content_type.contains(FORM_CONTENT_TYPE) {
        let prompt = url::form_urlencoded::parse(body)
            .find(|(name, _)| name == "prompt")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        return Ok(prompt);
    }

    if content_type.contains(JSON_CONTENT_TYPE) {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|_| ApiError::BadRequest("Invalid JSON".to_string()))?;
        return match value.get("prompt") {
            None | Some(serde_json::Value::Null) => Ok(String::new()),
            Some(serde_json::Value::String(prompt)) => Ok(prompt.clone()),
            Some(_) => Err(ApiError::BadRequest("Prompt must be a string".to_string())),
        };
    }

    Err(ApiError::BadRequest("Unsupported content type".to_string()))
}

/// Forward a prompt upstream; guarded by the weekly access key
///
/// A body over the configured limit is answered with `payload_too_large`.
#[instrument(skip_all)]
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let body = body?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let prompt = extract_prompt(content_type, &body)?;
    let result = state.chat_service.chat(&prompt).await?;

    Ok(Json(ChatResponse {
        response: result.content,
        model: result.model,
        usage: result.usage,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_prompt_is_decoded() {
        let prompt = extract_prompt(FORM_CONTENT_TYPE, b"prompt=hello+there%21&x=1").unwrap();
        assert_eq!(prompt, "hello there!");
    }

    #[test]
    fn form_uses_first_prompt() {
        let prompt = extract_prompt(FORM_CONTENT_TYPE, b"prompt=first&prompt=second").unwrap();
        assert_eq!(prompt, "first");
    }

    #[test]
    fn form_without_prompt_is_empty() {
        assert_eq!(extract_prompt(FORM_CONTENT_TYPE, b"other=1").unwrap(), "");
    }

    #[test]
    fn json_prompt_is_read() {
        let prompt =
            extract_prompt("application/json; charset=utf-8", br#"{"prompt":"hi"}"#).unwrap();
        assert_eq!(prompt, "hi");
    }

    #[test]
    fn json_without_prompt_is_empty() {
        assert_eq!(extract_prompt(JSON_CONTENT_TYPE, b"{}").unwrap(), "");
        assert_eq!(extract_prompt(JSON_CONTENT_TYPE, b"[1,2]").unwrap(), "");
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = extract_prompt(JSON_CONTENT_TYPE, b"{prompt:").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Invalid JSON"));
    }

    #[test]
    fn non_string_prompt_is_rejected() {
        let err = extract_prompt(JSON_CONTENT_TYPE, br#"{"prompt":42}"#).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn unsupported_content_type_is_rejected() {
        let err = extract_prompt("text/plain", b"prompt=hi").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Unsupported content type"));
        assert!(extract_prompt("", b"").is_err());
    }
}
