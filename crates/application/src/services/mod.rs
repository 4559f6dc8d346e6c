//! Application services

mod chat_service;
mod key_service;

pub use chat_service::ChatService;
pub use key_service::{KeyRefresh, KeyService};
