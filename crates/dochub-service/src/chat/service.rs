//! Chat sessions and the streaming bridge to the assistant.

use std::sync::Arc;

use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use dochub_assistant::{AssistantBackend, ChatEvent, RelayOutcome, relay};
use dochub_core::config::AssistantConfig;
use dochub_core::error::AppError;
use dochub_database::{ChatStore, DocumentStore, WorkspaceStore};
use dochub_entity::chat::{ChatMessage, ChatSession, CreateChatMessage, MessageRole};
use dochub_entity::workspace::Workspace;

use super::prompt::{ChatContext, build_request, system_prompt};
use crate::context::RequestContext;
use crate::workspace::require_workspace_owner;

const DEFAULT_TITLE: &str = "New chat";
const MAX_TITLE_CHARS: usize = 120;

/// Request to send a chat message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// The user's message.
    pub message: String,
    /// Editor context.
    #[serde(default)]
    pub context: Option<ChatContext>,
}

/// Everything the reply task needs, gathered before it is spawned.
struct PendingReply {
    session_id: Uuid,
    workspace: Workspace,
    context: ChatContext,
    history: Vec<ChatMessage>,
    message: String,
}

/// Removes a session from the in-flight set when the reply ends.
struct InFlight {
    sessions: Arc<DashSet<Uuid>>,
    session_id: Uuid,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.sessions.remove(&self.session_id);
    }
}

/// Manages chat sessions and relays assistant replies.
#[derive(Debug, Clone)]
pub struct ChatService {
    workspaces: Arc<dyn WorkspaceStore>,
    documents: Arc<dyn DocumentStore>,
    chats: Arc<dyn ChatStore>,
    backend: Arc<dyn AssistantBackend>,
    config: AssistantConfig,
    /// Sessions with a reply currently streaming.
    in_flight: Arc<DashSet<Uuid>>,
    /// Parent of every relay's cancellation token.
    shutdown: CancellationToken,
}

impl ChatService {
    /// Creates a new chat service.
    pub fn new(
        workspaces: Arc<dyn WorkspaceStore>,
        documents: Arc<dyn DocumentStore>,
        chats: Arc<dyn ChatStore>,
        backend: Arc<dyn AssistantBackend>,
        config: &AssistantConfig,
    ) -> Self {
        Self {
            workspaces,
            documents,
            chats,
            backend,
            config: config.clone(),
            in_flight: Arc::new(DashSet::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Number of replies currently streaming.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Cancel every streaming reply.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    async fn load_session(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        session_id: Uuid,
    ) -> Result<(Workspace, ChatSession), AppError> {
        let workspace = require_workspace_owner(self.workspaces.as_ref(), ctx, workspace_id).await?;
        let session = self
            .chats
            .find_session(session_id)
            .await?
            .filter(|s| s.workspace_id == workspace_id && s.user_id == ctx.user_id)
            .ok_or_else(|| AppError::not_found("Chat session not found"))?;
        Ok((workspace, session))
    }

    /// Lists the caller's sessions in a workspace, most recent first.
    pub async fn list_sessions(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
    ) -> Result<Vec<ChatSession>, AppError> {
        require_workspace_owner(self.workspaces.as_ref(), ctx, workspace_id).await?;
        self.chats.list_sessions(workspace_id, ctx.user_id).await
    }

    /// Starts a new session.
    pub async fn create_session(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        title: Option<String>,
    ) -> Result<ChatSession, AppError> {
        require_workspace_owner(self.workspaces.as_ref(), ctx, workspace_id).await?;

        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(AppError::validation(format!(
                "Title exceeds {MAX_TITLE_CHARS} characters"
            )));
        }

        let session = self
            .chats
            .create_session(workspace_id, ctx.user_id, &title)
            .await?;
        info!(
            user_id = %ctx.user_id,
            workspace_id = %workspace_id,
            session_id = %session.id,
            "Chat session created"
        );
        Ok(session)
    }

    /// Deletes a session and its messages.
    pub async fn delete_session(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        session_id: Uuid,
    ) -> Result<(), AppError> {
        self.load_session(ctx, workspace_id, session_id).await?;
        if self.in_flight.contains(&session_id) {
            return Err(AppError::conflict(
                "A reply is still streaming for this session",
            ));
        }
        self.chats.delete_session(session_id).await?;
        info!(session_id = %session_id, "Chat session deleted");
        Ok(())
    }

    /// A session's messages, oldest first.
    pub async fn list_messages(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        session_id: Uuid,
    ) -> Result<Vec<ChatMessage>, AppError> {
        self.load_session(ctx, workspace_id, session_id).await?;
        self.chats.list_messages(session_id).await
    }

    /// Store the user's message and start streaming the reply.
    ///
    /// Events arrive on the returned receiver; dropping it cancels the
    /// upstream call. A second send on a session whose reply is still
    /// streaming fails with `Conflict`.
    pub async fn send_message(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        session_id: Uuid,
        req: SendMessageRequest,
    ) -> Result<mpsc::Receiver<ChatEvent>, AppError> {
        let message = req.message.trim().to_string();
        if message.is_empty() {
            return Err(AppError::validation("Message cannot be empty"));
        }
        let context = req.context.unwrap_or_default();

        let (workspace, _session) = self.load_session(ctx, workspace_id, session_id).await?;

        if !self.in_flight.insert(session_id) {
            return Err(AppError::conflict(
                "A reply is already streaming for this session",
            ));
        }
        let guard = InFlight {
            sessions: self.in_flight.clone(),
            session_id,
        };

        let history = self
            .chats
            .recent_messages(session_id, self.config.history_limit)
            .await?;

        let metadata = if context.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::json!({ "context": context })
        };
        self.chats
            .insert_message(&CreateChatMessage {
                id: Uuid::new_v4(),
                session_id,
                role: MessageRole::User,
                content: message.clone(),
                metadata,
            })
            .await?;

        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let cancel = self.shutdown.child_token();
        let service = self.clone();
        let span = info_span!("chat_reply", session_id = %session_id, workspace_id = %workspace_id);

        tokio::spawn(
            async move {
                let _guard = guard;
                let reply = PendingReply {
                    session_id,
                    workspace,
                    context,
                    history,
                    message,
                };
                service.stream_reply(reply, tx, cancel).await;
            }
            .instrument(span),
        );

        Ok(rx)
    }

    async fn stream_reply(
        &self,
        reply: PendingReply,
        tx: mpsc::Sender<ChatEvent>,
        cancel: CancellationToken,
    ) {
        let PendingReply {
            session_id,
            workspace,
            context,
            history,
            message,
        } = reply;

        if tx
            .send(ChatEvent::InvestigationStart { session_id })
            .await
            .is_err()
        {
            return;
        }

        let selected = match &context.selected_file {
            Some(path) => match self.documents.find_by_path(workspace.id, path).await {
                Ok(item) => item.filter(|i| i.is_file()),
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to load selected file");
                    None
                }
            },
            None => None,
        };

        let system = system_prompt(
            &self.config.system_prompt,
            &workspace,
            &context,
            selected.as_ref(),
            self.config.max_context_bytes,
        );
        let request = build_request(system, &history, &message);

        let message_id = Uuid::new_v4();
        if tx.send(ChatEvent::MessageStart { message_id }).await.is_err() {
            return;
        }

        let upstream = tokio::select! {
            _ = cancel.cancelled() => return,
            result = self.backend.stream(request) => result,
        };
        let upstream = match upstream {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, backend = self.backend.name(), "Assistant request failed");
                let _ = tx.send(ChatEvent::from_error(&e)).await;
                return;
            }
        };

        match relay(upstream, &tx, &cancel).await {
            RelayOutcome::Completed(content) => {
                let stored = self
                    .chats
                    .insert_message(&CreateChatMessage {
                        id: message_id,
                        session_id,
                        role: MessageRole::Assistant,
                        content: content.clone(),
                        metadata: serde_json::json!({
                            "backend": self.backend.name(),
                        }),
                    })
                    .await;
                let event = match stored {
                    Ok(_) => {
                        info!(message_id = %message_id, bytes = content.len(), "Assistant reply stored");
                        ChatEvent::MessageComplete {
                            message_id,
                            content,
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to store assistant reply");
                        ChatEvent::from_error(&e)
                    }
                };
                let _ = tx.send(event).await;
            }
            RelayOutcome::Failed(e) => {
                error!(error = %e, "Assistant stream failed");
                let _ = tx.send(ChatEvent::from_error(&e)).await;
            }
            RelayOutcome::Cancelled => {
                info!("Assistant reply cancelled");
            }
        }
    }
}
