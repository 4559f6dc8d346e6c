//! AI Core - Upstream chat-completion client
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint (Groq by
//! default) with a fixed model, token cap and temperature.

pub mod chat_completions;
pub mod config;
pub mod error;
pub mod ports;

pub use chat_completions::ChatCompletionsEngine;
pub use config::InferenceConfig;
pub use error::InferenceError;
pub use ports::{InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse};
