//! Chat entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "chat_message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Sent by the user.
    User,
    /// Produced by the assistant.
    Assistant,
}

impl MessageRole {
    /// Return the role as the upstream API spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A conversation with the assistant, scoped to one workspace and user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    /// Unique session identifier.
    pub id: Uuid,
    /// Workspace the conversation is about.
    pub workspace_id: Uuid,
    /// User who owns the session.
    pub user_id: Uuid,
    /// Display title.
    pub title: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When a message was last stored.
    pub updated_at: DateTime<Utc>,
}

/// A persisted chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: Uuid,
    /// Owning session.
    pub session_id: Uuid,
    /// Author.
    pub role: MessageRole,
    /// Full message text.
    pub content: String,
    /// Request context and backend details.
    pub metadata: serde_json::Value,
    /// When the message was stored.
    pub created_at: DateTime<Utc>,
}

/// Data required to store a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatMessage {
    /// Pre-assigned identifier, announced to the client before the row exists.
    pub id: Uuid,
    /// Owning session.
    pub session_id: Uuid,
    /// Author.
    pub role: MessageRole,
    /// Full message text.
    pub content: String,
    /// Request context and backend details.
    pub metadata: serde_json::Value,
}
