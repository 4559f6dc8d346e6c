//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod chat_completions_inference_adapter;
mod file_key_record_store;
mod system_clock;

pub use chat_completions_inference_adapter::ChatCompletionsInferenceAdapter;
pub use file_key_record_store::FileKeyRecordStore;
pub use system_clock::SystemClock;
