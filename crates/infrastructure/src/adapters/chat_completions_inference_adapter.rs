//! Upstream inference adapter - Implements InferencePort using ai_core

use std::time::Instant;

use ai_core::{ChatCompletionsEngine, InferenceConfig, InferenceEngine, InferenceError, InferenceRequest};
use application::{
    error::ApplicationError,
    ports::{InferencePort, InferenceResult},
};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

/// Adapter for OpenAI-compatible chat-completions providers
#[derive(Debug)]
pub struct ChatCompletionsInferenceAdapter {
    engine: ChatCompletionsEngine,
}

impl ChatCompletionsInferenceAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: InferenceConfig) -> Result<Self, ApplicationError> {
        let engine = ChatCompletionsEngine::new(config).map_err(Self::map_error)?;
        Ok(Self { engine })
    }

    /// Convert ai_core error to application error
    fn map_error(e: InferenceError) -> ApplicationError {
        match e {
            InferenceError::ConnectionFailed(msg) => {
                ApplicationError::ExternalService(format!("upstream connection failed: {msg}"))
            },
            InferenceError::Timeout => {
                ApplicationError::ExternalService("upstream request timed out".to_string())
            },
            InferenceError::RequestFailed(msg) => {
                ApplicationError::ExternalService(format!("upstream request failed: {msg}"))
            },
            InferenceError::RateLimited => {
                ApplicationError::Inference("upstream rate limit exceeded".to_string())
            },
            InferenceError::ServerError { status, body } => {
                ApplicationError::Inference(format!("upstream returned status {status}: {body}"))
            },
            InferenceError::InvalidResponse(msg) => ApplicationError::InvalidResponse(msg),
            InferenceError::Configuration(msg) => ApplicationError::Configuration(msg),
        }
    }
}

#[async_trait]
impl InferencePort for ChatCompletionsInferenceAdapter {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<InferenceResult, ApplicationError> {
        let start = Instant::now();

        let response = self
            .engine
            .generate(InferenceRequest::simple(prompt))
            .await
            .map_err(|e| {
                warn!(error = %e, "Upstream inference failed");
                Self::map_error(e)
            })?;

        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let usage = response.usage.unwrap_or_else(|| serde_json::json!({}));

        info!(model = %response.model, latency_ms, "Inference completed");

        Ok(InferenceResult {
            content: response.content,
            model: response.model,
            usage,
        })
    }

    fn current_model(&self) -> String {
        self.engine.default_model().to_string()
    }
}
