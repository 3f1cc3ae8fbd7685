//! Events streamed to the browser while the assistant answers.

use serde::Serialize;
use uuid::Uuid;

use dochub_core::error::AppError;

/// One Server-Sent Event of the chat protocol.
///
/// A stream is `InvestigationStart`, `MessageStart`, any number of
/// `ContentDelta`, then exactly one of `MessageComplete` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// The request was accepted and context is being gathered.
    InvestigationStart { session_id: Uuid },
    /// The assistant reply has started.
    MessageStart { message_id: Uuid },
    /// A fragment of reply text.
    ContentDelta { delta: String },
    /// The reply is complete and stored.
    MessageComplete { message_id: Uuid, content: String },
    /// The reply failed.
    Error { message: String, code: String },
}

impl ChatEvent {
    /// The SSE `event:` name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvestigationStart { .. } => "investigation_start",
            Self::MessageStart { .. } => "message_start",
            Self::ContentDelta { .. } => "content_delta",
            Self::MessageComplete { .. } => "message_complete",
            Self::Error { .. } => "error",
        }
    }

    /// Whether the stream ends after this event.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::MessageComplete { .. } | Self::Error { .. })
    }

    /// Error event for a failed reply.
    pub fn from_error(err: &AppError) -> Self {
        Self::Error {
            message: err.message.clone(),
            code: err.kind.code().to_string(),
        }
    }
}
