//! Inference port - Interface for the upstream chat-completion API

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of an inference call
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// Generated response content (`None` when the upstream sent `null`)
    pub content: Option<String>,
    /// Model reported by the upstream
    pub model: String,
    /// Token usage exactly as reported by the upstream (`{}` when absent)
    pub usage: serde_json::Value,
}

/// Port for inference operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InferencePort: Send + Sync {
    /// Generate a response for a single user prompt
    async fn generate(&self, prompt: &str) -> Result<InferenceResult, ApplicationError>;

    /// Name of the model requests are sent to
    fn current_model(&self) -> String;
}
