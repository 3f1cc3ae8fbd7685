//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use dochub_assistant::AssistantBackend;
use dochub_auth::JwtDecoder;
use dochub_core::config::AppConfig;
use dochub_database::Store;
use dochub_service::{ChatService, DocumentService, WorkspaceService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Row store (PostgreSQL or in-memory)
    pub store: Store,

    // ── Auth ─────────────────────────────────────────────────
    /// Supabase access token decoder
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Workspace service
    pub workspace_service: Arc<WorkspaceService>,
    /// Documentation tree service
    pub document_service: Arc<DocumentService>,
    /// Chat bridge service
    pub chat_service: Arc<ChatService>,
}

impl AppState {
    /// Wire the services on top of a store and an assistant backend.
    pub fn new(config: AppConfig, store: Store, backend: Arc<dyn AssistantBackend>) -> Self {
        let workspace_service = WorkspaceService::new(store.workspaces.clone());
        let document_service = DocumentService::new(
            store.workspaces.clone(),
            store.documents.clone(),
            &config.documents,
        );
        let chat_service = ChatService::new(
            store.workspaces.clone(),
            store.documents.clone(),
            store.chats.clone(),
            backend,
            &config.assistant,
        );

        Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            config: Arc::new(config),
            store,
            workspace_service: Arc::new(workspace_service),
            document_service: Arc::new(document_service),
            chat_service: Arc::new(chat_service),
        }
    }
}
