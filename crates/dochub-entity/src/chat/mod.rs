//! Chat session and message entities.

pub mod model;

pub use model::{ChatMessage, ChatSession, CreateChatMessage, MessageRole};
