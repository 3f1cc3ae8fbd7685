//! Workspace CRUD.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use dochub_core::error::AppError;
use dochub_database::WorkspaceStore;
use dochub_entity::workspace::{CreateWorkspace, Workspace};

use super::access::require_workspace_owner;
use crate::context::RequestContext;

const MAX_WORKSPACE_NAME: usize = 255;

/// Request to create a workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateWorkspaceRequest {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Linked GitHub repository as `owner/repo`.
    pub repository: Option<String>,
}

/// Manages the caller's workspaces.
#[derive(Debug, Clone)]
pub struct WorkspaceService {
    /// Workspace rows.
    workspaces: Arc<dyn WorkspaceStore>,
}

impl WorkspaceService {
    /// Creates a new workspace service.
    pub fn new(workspaces: Arc<dyn WorkspaceStore>) -> Self {
        Self { workspaces }
    }

    /// Lists the caller's workspaces.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Workspace>, AppError> {
        self.workspaces.list_workspaces(ctx.user_id).await
    }

    /// Gets one of the caller's workspaces.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Workspace, AppError> {
        require_workspace_owner(self.workspaces.as_ref(), ctx, id).await
    }

    /// Creates a workspace owned by the caller.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateWorkspaceRequest,
    ) -> Result<Workspace, AppError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Workspace name cannot be empty"));
        }
        if name.chars().count() > MAX_WORKSPACE_NAME {
            return Err(AppError::validation(format!(
                "Workspace name exceeds {MAX_WORKSPACE_NAME} characters"
            )));
        }

        let repository = req
            .repository
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if let Some(repo) = &repository {
            if !is_repository_slug(repo) {
                return Err(AppError::validation(format!(
                    "Repository must look like 'owner/name', got '{repo}'"
                )));
            }
        }

        let workspace = self
            .workspaces
            .create_workspace(&CreateWorkspace {
                owner_id: ctx.user_id,
                name: name.to_string(),
                description: req.description.filter(|d| !d.trim().is_empty()),
                repository,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            workspace_id = %workspace.id,
            "Workspace created"
        );

        Ok(workspace)
    }

    /// Deletes a workspace with its documentation tree and chat history.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        require_workspace_owner(self.workspaces.as_ref(), ctx, id).await?;
        self.workspaces.delete_workspace(id).await?;

        info!(user_id = %ctx.user_id, workspace_id = %id, "Workspace deleted");
        Ok(())
    }
}

/// `owner/name` using the characters GitHub allows in both parts.
fn is_repository_slug(value: &str) -> bool {
    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    match value.split_once('/') {
        Some((owner, name)) => valid_part(owner) && valid_part(name),
        None => false,
    }
}
