//! Chat sessions and the streaming bridge to the assistant.

pub mod prompt;
pub mod service;

pub use prompt::ChatContext;
pub use service::{ChatService, SendMessageRequest};
