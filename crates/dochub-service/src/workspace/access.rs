//! Workspace ownership checks.

use tracing::warn;
use uuid::Uuid;

use dochub_core::error::AppError;
use dochub_database::WorkspaceStore;
use dochub_entity::workspace::Workspace;

use crate::context::RequestContext;

/// Load a workspace and require that the caller owns it.
///
/// A missing workspace is `NotFound`; another user's workspace is
/// `Forbidden`.
pub async fn require_workspace_owner(
    store: &dyn WorkspaceStore,
    ctx: &RequestContext,
    workspace_id: Uuid,
) -> Result<Workspace, AppError> {
    let workspace = store
        .find_workspace(workspace_id)
        .await?
        .ok_or_else(|| AppError::not_found("Workspace not found"))?;

    if !workspace.is_owned_by(ctx.user_id) {
        warn!(
            user_id = %ctx.user_id,
            workspace_id = %workspace_id,
            "Workspace access denied"
        );
        return Err(AppError::forbidden("You do not have access to this workspace"));
    }

    Ok(workspace)
}
