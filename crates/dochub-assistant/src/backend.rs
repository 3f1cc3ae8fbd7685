//! Assistant backend abstraction and selection.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;
use tracing::info;

use dochub_core::config::AssistantConfig;
use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_entity::chat::MessageRole;

/// Incremental text produced by a backend. Ends after the last delta; an
/// `Err` item means the reply failed part-way.
pub type DeltaStream = BoxStream<'static, AppResult<String>>;

/// One turn of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    /// Who spoke.
    pub role: MessageRole,
    /// What was said.
    pub content: String,
}

impl PromptMessage {
    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A complete request to the assistant.
#[derive(Debug, Clone, Default)]
pub struct AssistantRequest {
    /// System prompt including workspace context.
    pub system: String,
    /// Conversation history ending with the new user message.
    pub messages: Vec<PromptMessage>,
}

impl AssistantRequest {
    /// Content of the last user turn, if any.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// A source of streamed assistant replies.
///
/// Dropping the returned stream must abort any upstream work.
#[async_trait]
pub trait AssistantBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Short backend name recorded in message metadata.
    fn name(&self) -> &'static str;

    /// Start a reply. Errors returned here happen before any text is produced.
    async fn stream(&self, request: AssistantRequest) -> AppResult<DeltaStream>;
}

/// Build the backend named by `config.provider`.
pub fn build_backend(config: &AssistantConfig) -> AppResult<Arc<dyn AssistantBackend>> {
    let backend: Arc<dyn AssistantBackend> = match config.provider.as_str() {
        "anthropic" => {
            info!(model = %config.model, "Initializing Anthropic assistant backend");
            Arc::new(crate::anthropic::AnthropicBackend::new(config)?)
        }
        "echo" => {
            info!("Initializing echo assistant backend");
            Arc::new(crate::echo::EchoBackend::new())
        }
        other => {
            return Err(AppError::configuration(format!(
                "Unknown assistant provider: '{other}'. Supported: anthropic, echo"
            )));
        }
    };
    Ok(backend)
}
