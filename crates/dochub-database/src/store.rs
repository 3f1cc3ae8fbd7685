//! Row store traits.
//!
//! Services depend on these traits only. Every method is a single atomic
//! step from the caller's point of view: multi-row changes (subtree path
//! rewrites, cascading deletes) either fully apply or not at all.

use async_trait::async_trait;
use uuid::Uuid;

use dochub_core::result::AppResult;
use dochub_entity::chat::{ChatMessage, ChatSession, CreateChatMessage};
use dochub_entity::document::{CreateDocumentItem, DocumentItem, RelocateItem};
use dochub_entity::workspace::{CreateWorkspace, Workspace};

/// Workspace rows.
#[async_trait]
pub trait WorkspaceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a workspace.
    async fn create_workspace(&self, data: &CreateWorkspace) -> AppResult<Workspace>;

    /// Find a workspace by ID.
    async fn find_workspace(&self, id: Uuid) -> AppResult<Option<Workspace>>;

    /// List a user's workspaces, oldest first.
    async fn list_workspaces(&self, owner_id: Uuid) -> AppResult<Vec<Workspace>>;

    /// Delete a workspace with its items and chat sessions.
    async fn delete_workspace(&self, id: Uuid) -> AppResult<bool>;
}

/// Documentation item rows.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find an item by ID within a workspace.
    async fn find_item(&self, workspace_id: Uuid, id: Uuid) -> AppResult<Option<DocumentItem>>;

    /// Find an item by its path within a workspace.
    async fn find_by_path(&self, workspace_id: Uuid, path: &str)
    -> AppResult<Option<DocumentItem>>;

    /// All items of a workspace ordered by `order_index`, then creation.
    async fn list_items(&self, workspace_id: Uuid) -> AppResult<Vec<DocumentItem>>;

    /// Insert an item under `parent_id`, after its last sibling.
    ///
    /// Fails with `NotFound` when the parent is missing, `Validation` when it
    /// is a file, and `Conflict` when the path is taken.
    async fn insert_item(&self, data: &CreateDocumentItem) -> AppResult<DocumentItem>;

    /// Rename, move, or reorder an item, rewriting descendant paths.
    ///
    /// Parent errors are those of `insert_item`, plus `Validation` when the
    /// new parent is the item itself or one of its descendants.
    async fn relocate_item(&self, change: &RelocateItem) -> AppResult<DocumentItem>;

    /// Replace a file's content and metadata.
    async fn update_content(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        content: &str,
        metadata: &serde_json::Value,
    ) -> AppResult<DocumentItem>;

    /// Delete an item and its whole subtree.
    async fn delete_item(&self, workspace_id: Uuid, id: Uuid) -> AppResult<bool>;
}

/// Chat session and message rows.
#[async_trait]
pub trait ChatStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a session.
    async fn create_session(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        title: &str,
    ) -> AppResult<ChatSession>;

    /// Find a session by ID.
    async fn find_session(&self, id: Uuid) -> AppResult<Option<ChatSession>>;

    /// List a user's sessions in a workspace, most recently active first.
    async fn list_sessions(&self, workspace_id: Uuid, user_id: Uuid)
    -> AppResult<Vec<ChatSession>>;

    /// Delete a session and its messages.
    async fn delete_session(&self, id: Uuid) -> AppResult<bool>;

    /// Store a message and touch the session's `updated_at`.
    async fn insert_message(&self, data: &CreateChatMessage) -> AppResult<ChatMessage>;

    /// All messages of a session, oldest first.
    async fn list_messages(&self, session_id: Uuid) -> AppResult<Vec<ChatMessage>>;

    /// The last `limit` messages of a session, oldest first.
    async fn recent_messages(&self, session_id: Uuid, limit: usize)
    -> AppResult<Vec<ChatMessage>>;
}
