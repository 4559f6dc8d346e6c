//! Integration tests for the upstream inference adapter using WireMock

use ai_core::InferenceConfig;
use application::{error::ApplicationError, ports::InferencePort};
use infrastructure::ChatCompletionsInferenceAdapter;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn adapter_for(server: &MockServer) -> ChatCompletionsInferenceAdapter {
    ChatCompletionsInferenceAdapter::new(
        InferenceConfig::default()
            .with_base_url(server.uri())
            .with_api_key("gsk_test"),
    )
    .unwrap()
}

#[tokio::test]
async fn relays_content_model_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "llama3-70b-8192",
            "choices": [{"message": {"role": "assistant", "content": "Paris."}}],
            "usage": {"prompt_tokens": 7, "completion_tokens": 2, "total_tokens": 9, "queue_time": 0.01}
        })))
        .mount(&server)
        .await;

    let result = adapter_for(&server)
        .generate("Capital of France?")
        .await
        .unwrap();

    assert_eq!(result.content.as_deref(), Some("Paris."));
    assert_eq!(result.model, "llama3-70b-8192");
    assert_eq!(result.usage["total_tokens"], 9);
    assert_eq!(result.usage["queue_time"], 0.01);
}

#[tokio::test]
async fn missing_usage_becomes_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "llama3-70b-8192",
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let result = adapter_for(&server).generate("hi").await.unwrap();
    assert_eq!(result.usage, serde_json::json!({}));
}

#[tokio::test]
async fn partial_usage_is_not_padded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "llama3-70b-8192",
            "choices": [{"message": {"role": "assistant", "content": "ok"}}],
            "usage": {"total_tokens": 3}
        })))
        .mount(&server)
        .await;

    let result = adapter_for(&server).generate("hi").await.unwrap();
    assert_eq!(result.usage, serde_json::json!({"total_tokens": 3}));
}

#[tokio::test]
async fn upstream_error_status_is_an_inference_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = adapter_for(&server).generate("hi").await.unwrap_err();
    assert!(matches!(err, ApplicationError::Inference(_)));
}

#[tokio::test]
async fn missing_choices_is_an_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "llama3-70b-8192",
            "choices": []
        })))
        .mount(&server)
        .await;

    let err = adapter_for(&server).generate("hi").await.unwrap_err();
    assert!(matches!(err, ApplicationError::InvalidResponse(_)));
}
