//! In-memory store implementing every store trait behind one lock.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_entity::chat::{ChatMessage, ChatSession, CreateChatMessage};
use dochub_entity::document::placement::{
    child_path, ensure_room_to_shift, next_sibling_order, rebase_path, resolve_parent,
};
use dochub_entity::document::{CreateDocumentItem, DocumentItem, RelocateItem, SiblingPlacement};
use dochub_entity::workspace::{CreateWorkspace, Workspace};

use crate::store::{ChatStore, DocumentStore, WorkspaceStore};

/// Table contents. Vectors keep insertion order, which stands in for
/// `created_at` ordering.
#[derive(Debug, Default)]
struct MemoryState {
    workspaces: Vec<Workspace>,
    items: Vec<DocumentItem>,
    sessions: Vec<ChatSession>,
    messages: Vec<ChatMessage>,
}

impl MemoryState {
    fn path_taken(&self, workspace_id: Uuid, path: &str, except: Option<Uuid>) -> bool {
        self.items
            .iter()
            .any(|i| i.workspace_id == workspace_id && i.path == path && Some(i.id) != except)
    }

    fn find(&self, workspace_id: Uuid, id: Uuid) -> Option<&DocumentItem> {
        self.items
            .iter()
            .find(|i| i.workspace_id == workspace_id && i.id == id)
    }

    /// The item followed by its ancestors, nearest first.
    fn ancestors(&self, workspace_id: Uuid, id: Uuid) -> Vec<DocumentItem> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(id);

        while let Some(current) = next {
            if !seen.insert(current) {
                break;
            }
            let Some(item) = self.find(workspace_id, current) else {
                break;
            };
            next = item.parent_id;
            chain.push(item.clone());
        }

        chain
    }

    /// Checked parent of a new or moved item; `None` at root.
    fn parent(
        &self,
        workspace_id: Uuid,
        parent_id: Option<Uuid>,
        moving: Option<Uuid>,
    ) -> AppResult<Option<DocumentItem>> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        let chain = self.ancestors(workspace_id, parent_id);
        resolve_parent(&chain, moving).map(|p| Some(p.clone()))
    }

    fn max_sibling_order(
        &self,
        workspace_id: Uuid,
        parent_id: Option<Uuid>,
        except: Option<Uuid>,
    ) -> Option<i32> {
        self.items
            .iter()
            .filter(|i| {
                i.workspace_id == workspace_id && i.parent_id == parent_id && Some(i.id) != except
            })
            .map(|i| i.order_index)
            .max()
    }

    /// IDs of `root_id` and everything below it.
    fn subtree_ids(&self, workspace_id: Uuid, root_id: Uuid) -> HashSet<Uuid> {
        let mut ids = HashSet::from([root_id]);
        let mut frontier = vec![root_id];
        while let Some(parent) = frontier.pop() {
            for item in &self.items {
                if item.workspace_id == workspace_id
                    && item.parent_id == Some(parent)
                    && ids.insert(item.id)
                {
                    frontier.push(item.id);
                }
            }
        }
        ids
    }
}

/// Row store kept entirely in memory.
///
/// Every trait method takes the single lock for its whole duration, which
/// gives the same all-or-nothing behavior as a PostgreSQL transaction.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkspaceStore for MemoryStore {
    async fn create_workspace(&self, data: &CreateWorkspace) -> AppResult<Workspace> {
        let now = Utc::now();
        let workspace = Workspace {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            name: data.name.clone(),
            description: data.description.clone(),
            repository: data.repository.clone(),
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.workspaces.push(workspace.clone());
        Ok(workspace)
    }

    async fn find_workspace(&self, id: Uuid) -> AppResult<Option<Workspace>> {
        let state = self.state.read().await;
        Ok(state.workspaces.iter().find(|w| w.id == id).cloned())
    }

    async fn list_workspaces(&self, owner_id: Uuid) -> AppResult<Vec<Workspace>> {
        let state = self.state.read().await;
        Ok(state
            .workspaces
            .iter()
            .filter(|w| w.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn delete_workspace(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.workspaces.len();
        state.workspaces.retain(|w| w.id != id);
        if state.workspaces.len() == before {
            return Ok(false);
        }

        state.items.retain(|i| i.workspace_id != id);
        let session_ids: HashSet<Uuid> = state
            .sessions
            .iter()
            .filter(|s| s.workspace_id == id)
            .map(|s| s.id)
            .collect();
        state.sessions.retain(|s| s.workspace_id != id);
        state
            .messages
            .retain(|m| !session_ids.contains(&m.session_id));
        Ok(true)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_item(&self, workspace_id: Uuid, id: Uuid) -> AppResult<Option<DocumentItem>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .find(|i| i.workspace_id == workspace_id && i.id == id)
            .cloned())
    }

    async fn find_by_path(
        &self,
        workspace_id: Uuid,
        path: &str,
    ) -> AppResult<Option<DocumentItem>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .find(|i| i.workspace_id == workspace_id && i.path == path)
            .cloned())
    }

    async fn list_items(&self, workspace_id: Uuid) -> AppResult<Vec<DocumentItem>> {
        let state = self.state.read().await;
        let mut items: Vec<DocumentItem> = state
            .items
            .iter()
            .filter(|i| i.workspace_id == workspace_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.order_index);
        Ok(items)
    }

    async fn insert_item(&self, data: &CreateDocumentItem) -> AppResult<DocumentItem> {
        let mut state = self.state.write().await;
        let parent = state.parent(data.workspace_id, data.parent_id, None)?;
        let path = child_path(parent.as_ref(), &data.name);
        if state.path_taken(data.workspace_id, &path, None) {
            return Err(AppError::conflict(format!(
                "An item at path '{path}' already exists"
            )));
        }
        let order_index = next_sibling_order(state.max_sibling_order(
            data.workspace_id,
            data.parent_id,
            None,
        ))?;

        let now = Utc::now();
        let item = DocumentItem {
            id: Uuid::new_v4(),
            workspace_id: data.workspace_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            item_type: data.item_type,
            path,
            content: data.content.clone(),
            file_extension: data.file_extension.clone(),
            order_index,
            metadata: data.metadata.clone(),
            created_at: now,
            updated_at: now,
        };
        state.items.push(item.clone());
        Ok(item)
    }

    async fn relocate_item(&self, change: &RelocateItem) -> AppResult<DocumentItem> {
        let mut state = self.state.write().await;
        let ws = change.workspace_id;
        let current = state
            .find(ws, change.item_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Item {} not found", change.item_id)))?;

        let parent = state.parent(ws, change.parent_id, Some(current.id))?;
        let new_path = child_path(parent.as_ref(), &change.name);
        if state.path_taken(ws, &new_path, Some(current.id)) {
            return Err(AppError::conflict(format!(
                "An item at path '{new_path}' already exists"
            )));
        }

        let siblings_max = state.max_sibling_order(ws, change.parent_id, Some(current.id));
        let order_index = match change.placement {
            SiblingPlacement::Keep => current.order_index,
            SiblingPlacement::Last => next_sibling_order(siblings_max)?,
            SiblingPlacement::At(index) => {
                ensure_room_to_shift(siblings_max)?;
                index
            }
        };

        let now = Utc::now();
        let mut updated = None;
        let mut rewritten = 0usize;

        for item in state.items.iter_mut().filter(|i| i.workspace_id == ws) {
            if item.id == current.id {
                item.parent_id = change.parent_id;
                item.name = change.name.clone();
                item.path = new_path.clone();
                item.order_index = order_index;
                item.updated_at = now;
                updated = Some(item.clone());
                continue;
            }
            if let SiblingPlacement::At(index) = change.placement {
                if item.parent_id == change.parent_id && item.order_index >= index {
                    item.order_index += 1;
                }
            }
            if new_path != current.path {
                if let Some(path) = rebase_path(&item.path, &current.path, &new_path) {
                    item.path = path;
                    item.updated_at = now;
                    rewritten += 1;
                }
            }
        }

        debug!(item_id = %current.id, descendants = rewritten, "Relocated item");
        updated.ok_or_else(|| AppError::not_found(format!("Item {} not found", change.item_id)))
    }

    async fn update_content(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        content: &str,
        metadata: &serde_json::Value,
    ) -> AppResult<DocumentItem> {
        let mut state = self.state.write().await;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.workspace_id == workspace_id && i.id == id)
            .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))?;

        item.content = Some(content.to_string());
        item.metadata = metadata.clone();
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete_item(&self, workspace_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !state
            .items
            .iter()
            .any(|i| i.workspace_id == workspace_id && i.id == id)
        {
            return Ok(false);
        }

        let doomed = state.subtree_ids(workspace_id, id);
        state.items.retain(|i| !doomed.contains(&i.id));
        Ok(true)
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn create_session(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        title: &str,
    ) -> AppResult<ChatSession> {
        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::new_v4(),
            workspace_id,
            user_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> AppResult<Option<ChatSession>> {
        let state = self.state.read().await;
        Ok(state.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn list_sessions(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Vec<ChatSession>> {
        let state = self.state.read().await;
        let mut sessions: Vec<ChatSession> = state
            .sessions
            .iter()
            .filter(|s| s.workspace_id == workspace_id && s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn delete_session(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.id != id);
        state.messages.retain(|m| m.session_id != id);
        Ok(state.sessions.len() != before)
    }

    async fn insert_message(&self, data: &CreateChatMessage) -> AppResult<ChatMessage> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == data.session_id)
            .ok_or_else(|| AppError::not_found(format!("Session {} not found", data.session_id)))?;
        session.updated_at = now;

        let message = ChatMessage {
            id: data.id,
            session_id: data.session_id,
            role: data.role,
            content: data.content.clone(),
            metadata: data.metadata.clone(),
            created_at: now,
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, session_id: Uuid) -> AppResult<Vec<ChatMessage>> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn recent_messages(
        &self,
        session_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<ChatMessage>> {
        let mut messages = self.list_messages(session_id).await?;
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.split_off(skip))
    }
}
