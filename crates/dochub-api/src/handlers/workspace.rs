//! Workspace handlers.

use axum::Json;
use axum::extract::State;
use uuid::Uuid;

use dochub_entity::workspace::Workspace;

use crate::dto::request::CreateWorkspaceBody;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

/// GET /api/workspaces
pub async fn list_workspaces(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Workspace>>>, ApiError> {
    let workspaces = state.workspace_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(workspaces)))
}

/// POST /api/workspaces
pub async fn create_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreateWorkspaceBody>,
) -> Result<Json<ApiResponse<Workspace>>, ApiError> {
    let workspace = state.workspace_service.create(&auth, body.into()).await?;
    Ok(Json(ApiResponse::ok(workspace)))
}

/// GET /api/workspaces/{workspace_id}
pub async fn get_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(workspace_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Workspace>>, ApiError> {
    let workspace = state.workspace_service.get(&auth, workspace_id).await?;
    Ok(Json(ApiResponse::ok(workspace)))
}

/// DELETE /api/workspaces/{workspace_id}
pub async fn delete_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(workspace_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.workspace_service.delete(&auth, workspace_id).await?;
    Ok(Json(ApiResponse::empty()))
}
