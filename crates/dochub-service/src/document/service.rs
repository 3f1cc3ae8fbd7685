//! Documentation tree reads and mutations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use dochub_core::config::DocumentsConfig;
use dochub_core::error::AppError;
use dochub_database::{DocumentStore, WorkspaceStore};
use dochub_entity::document::{
    CreateDocumentItem, DocumentItem, DocumentMetadata, DocumentNode, ItemType,
    MAX_ORDER_INDEX, RelocateItem, SiblingPlacement,
};

use super::lock::WorkspaceLocks;
use super::path::{PathBuilder, file_name, strip_extension};
use super::tree::{build_forest, take_subtree};
use crate::context::RequestContext;
use crate::workspace::require_workspace_owner;

/// Request to create a folder or file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    /// Folder name, or file base name.
    pub name: String,
    /// Folder or file.
    pub item_type: ItemType,
    /// Parent folder (None for root level).
    pub parent_id: Option<Uuid>,
    /// Extension for files.
    pub file_extension: Option<String>,
}

/// Request to rename, move, and/or reorder an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    /// New name (base name for files).
    pub name: Option<String>,
    /// `Some(None)` moves to root, `Some(Some(id))` under a folder.
    pub parent_id: Option<Option<Uuid>>,
    /// Requested position among the (new) siblings.
    pub order_index: Option<i32>,
}

impl UpdateItemRequest {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent_id.is_none() && self.order_index.is_none()
    }
}

/// Result of a content update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUpdated {
    /// The item's new `updated_at`.
    pub updated_at: DateTime<Utc>,
}

/// Reads and mutates a workspace's documentation tree.
#[derive(Debug, Clone)]
pub struct DocumentService {
    /// Workspace rows, for ownership checks.
    workspaces: Arc<dyn WorkspaceStore>,
    /// Documentation item rows.
    documents: Arc<dyn DocumentStore>,
    /// Name and path rules.
    paths: PathBuilder,
    /// Per-workspace write serialization.
    locks: Arc<WorkspaceLocks>,
    /// Maximum content size in bytes.
    max_content_bytes: usize,
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        workspaces: Arc<dyn WorkspaceStore>,
        documents: Arc<dyn DocumentStore>,
        config: &DocumentsConfig,
    ) -> Self {
        Self {
            workspaces,
            documents,
            paths: PathBuilder::new(config),
            locks: Arc::new(WorkspaceLocks::new()),
            max_content_bytes: config.max_content_bytes,
        }
    }

    async fn authorize(&self, ctx: &RequestContext, workspace_id: Uuid) -> Result<(), AppError> {
        require_workspace_owner(self.workspaces.as_ref(), ctx, workspace_id).await?;
        Ok(())
    }

    async fn load_item(&self, workspace_id: Uuid, id: Uuid) -> Result<DocumentItem, AppError> {
        self.documents
            .find_item(workspace_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Item not found"))
    }

    /// The workspace's whole tree. An empty workspace yields `[]`.
    pub async fn get_tree(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
    ) -> Result<Vec<DocumentNode>, AppError> {
        self.authorize(ctx, workspace_id).await?;
        let items = self.documents.list_items(workspace_id).await?;
        debug!(workspace_id = %workspace_id, items = items.len(), "Assembling tree");
        Ok(build_forest(items))
    }

    /// A single item with its content.
    pub async fn get_item(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<DocumentItem, AppError> {
        self.authorize(ctx, workspace_id).await?;
        self.load_item(workspace_id, id).await
    }

    /// Look up an item by path, for callers that already checked access.
    pub async fn find_by_path(
        &self,
        workspace_id: Uuid,
        path: &str,
    ) -> Result<Option<DocumentItem>, AppError> {
        self.documents.find_by_path(workspace_id, path).await
    }

    /// Creates a folder or file.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        req: CreateItemRequest,
    ) -> Result<DocumentNode, AppError> {
        self.authorize(ctx, workspace_id).await?;

        let base = self.paths.validate_name(&req.name)?;
        let extension = match req.item_type {
            ItemType::File => Some(self.paths.validate_extension(req.file_extension.as_deref())?),
            ItemType::Folder => None,
        };
        let name = match &extension {
            Some(ext) => file_name(&base, ext),
            None => base.clone(),
        };

        let _guard = self.locks.acquire(workspace_id).await;

        let mut metadata = DocumentMetadata {
            created_by: Some(ctx.user_id),
            ..Default::default()
        };
        let content = extension.as_deref().map(|ext| {
            metadata.mime_type = Some(DocumentMetadata::mime_type_for(ext).to_string());
            format!("# {base}\n\n")
        });

        let item = self
            .documents
            .insert_item(&CreateDocumentItem {
                workspace_id,
                parent_id: req.parent_id,
                name,
                item_type: req.item_type,
                content,
                file_extension: extension,
                metadata: metadata.to_json_value(),
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            workspace_id = %workspace_id,
            item_id = %item.id,
            path = %item.path,
            item_type = %item.item_type,
            "Item created"
        );

        Ok(DocumentNode::leaf(item))
    }

    /// Renames, moves, and/or reorders an item. Descendant paths follow.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        id: Uuid,
        req: UpdateItemRequest,
    ) -> Result<DocumentNode, AppError> {
        self.authorize(ctx, workspace_id).await?;
        if req.is_empty() {
            return Err(AppError::validation(
                "Provide at least one of name, parent_id, order_index",
            ));
        }
        if let Some(index) = req.order_index {
            if !(0..=MAX_ORDER_INDEX).contains(&index) {
                return Err(AppError::validation(format!(
                    "order_index must be between 0 and {MAX_ORDER_INDEX}"
                )));
            }
        }

        let _guard = self.locks.acquire(workspace_id).await;
        let item = self.load_item(workspace_id, id).await?;

        let name = match (&req.name, &item.file_extension) {
            (None, _) => item.name.clone(),
            (Some(raw), Some(ext)) if item.is_file() => {
                let base = self.paths.validate_name(strip_extension(raw, ext))?;
                file_name(&base, ext)
            }
            (Some(raw), _) => self.paths.validate_name(raw)?,
        };

        let parent_id = req.parent_id.unwrap_or(item.parent_id);
        let placement = match req.order_index {
            Some(index) => SiblingPlacement::At(index),
            None if parent_id != item.parent_id => SiblingPlacement::Last,
            None => SiblingPlacement::Keep,
        };

        let updated = self
            .documents
            .relocate_item(&RelocateItem {
                workspace_id,
                item_id: item.id,
                parent_id,
                name,
                placement,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            workspace_id = %workspace_id,
            item_id = %item.id,
            old_path = %item.path,
            new_path = %updated.path,
            order_index = updated.order_index,
            "Item updated"
        );

        let items = self.documents.list_items(workspace_id).await?;
        Ok(take_subtree(build_forest(items), updated.id)
            .unwrap_or_else(|| DocumentNode::leaf(updated)))
    }

    /// Deletes an item and everything below it.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError> {
        self.authorize(ctx, workspace_id).await?;

        let _guard = self.locks.acquire(workspace_id).await;
        let item = self.load_item(workspace_id, id).await?;
        self.documents.delete_item(workspace_id, id).await?;

        info!(
            user_id = %ctx.user_id,
            workspace_id = %workspace_id,
            item_id = %id,
            path = %item.path,
            "Item deleted"
        );
        Ok(())
    }

    /// Replaces a file's content.
    pub async fn update_content(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        id: Uuid,
        content: &str,
    ) -> Result<ContentUpdated, AppError> {
        self.authorize(ctx, workspace_id).await?;
        let item = self.load_item(workspace_id, id).await?;

        if !item.is_file() {
            return Err(AppError::validation("Only files have content").with_reason("not_a_file"));
        }
        if content.len() > self.max_content_bytes {
            return Err(AppError::payload_too_large(format!(
                "Content is {} bytes; the limit is {} bytes",
                content.len(),
                self.max_content_bytes
            ))
            .with_details(serde_json::json!({
                "size": content.len(),
                "limit": self.max_content_bytes,
            })));
        }

        let mut metadata = DocumentMetadata::from_json_value(&item.metadata);
        metadata.last_edited = Some(Utc::now());

        let updated = self
            .documents
            .update_content(workspace_id, id, content, &metadata.to_json_value())
            .await?;

        debug!(
            workspace_id = %workspace_id,
            item_id = %id,
            bytes = content.len(),
            "Content updated"
        );

        Ok(ContentUpdated {
            updated_at: updated.updated_at,
        })
    }
}
