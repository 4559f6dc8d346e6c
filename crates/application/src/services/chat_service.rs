//! Chat service - Stateless single-prompt proxy to the upstream model

use std::{fmt, sync::Arc, time::Instant};

use tracing::{debug, instrument};

use crate::{
    error::ApplicationError,
    ports::{InferencePort, InferenceResult},
};

/// Service forwarding chat prompts upstream
pub struct ChatService {
    inference: Arc<dyn InferencePort>,
}

impl fmt::Debug for ChatService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatService")
            .field("model", &self.inference.current_model())
            .finish_non_exhaustive()
    }
}

impl ChatService {
    /// Create a new chat service
    pub fn new(inference: Arc<dyn InferencePort>) -> Self {
        Self { inference }
    }

    /// Forward a single prompt and return the upstream answer
    ///
    /// Empty or whitespace-only prompts are rejected without an upstream call.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn chat(&self, prompt: &str) -> Result<InferenceResult, ApplicationError> {
        if prompt.trim().is_empty() {
            return Err(ApplicationError::InvalidInput("Prompt is required".to_string()));
        }

        let start = Instant::now();
        let result = self.inference.generate(prompt).await?;

        debug!(
            model = %result.model,
            latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Chat response generated"
        );

        Ok(result)
    }
}
