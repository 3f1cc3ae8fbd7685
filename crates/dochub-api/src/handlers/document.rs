//! Documentation tree handlers.

use axum::Json;
use axum::extract::State;
use uuid::Uuid;

use dochub_entity::document::{DocumentItem, DocumentNode};
use dochub_service::ContentUpdated;

use crate::dto::request::{CreateItemBody, UpdateContentBody, UpdateItemBody};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

/// GET /api/workspaces/{workspace_id}/documents
pub async fn get_tree(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(workspace_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<DocumentNode>>>, ApiError> {
    let tree = state.document_service.get_tree(&auth, workspace_id).await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// POST /api/workspaces/{workspace_id}/documents
pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(workspace_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<CreateItemBody>,
) -> Result<Json<ApiResponse<DocumentNode>>, ApiError> {
    let node = state
        .document_service
        .create(&auth, workspace_id, body.into())
        .await?;
    Ok(Json(ApiResponse::ok(node)))
}

/// GET /api/workspaces/{workspace_id}/documents/{item_id}
pub async fn get_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((workspace_id, item_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<DocumentItem>>, ApiError> {
    let item = state
        .document_service
        .get_item(&auth, workspace_id, item_id)
        .await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// PATCH /api/workspaces/{workspace_id}/documents/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((workspace_id, item_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdateItemBody>,
) -> Result<Json<ApiResponse<DocumentNode>>, ApiError> {
    let node = state
        .document_service
        .update(&auth, workspace_id, item_id, body.into())
        .await?;
    Ok(Json(ApiResponse::ok(node)))
}

/// DELETE /api/workspaces/{workspace_id}/documents/{item_id}
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((workspace_id, item_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .document_service
        .delete(&auth, workspace_id, item_id)
        .await?;
    Ok(Json(ApiResponse::empty()))
}

/// PUT /api/workspaces/{workspace_id}/documents/{item_id}/content
pub async fn update_content(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((workspace_id, item_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdateContentBody>,
) -> Result<Json<ApiResponse<ContentUpdated>>, ApiError> {
    let updated = state
        .document_service
        .update_content(&auth, workspace_id, item_id, &body.content)
        .await?;
    Ok(Json(ApiResponse::ok(updated)))
}
