//! Chat session handlers and the reply event stream.

use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use dochub_assistant::ChatEvent;
use dochub_entity::chat::{ChatMessage, ChatSession};

use crate::dto::request::{CreateSessionBody, SendMessageBody};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

/// GET /api/workspaces/{workspace_id}/chat/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(workspace_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<ChatSession>>>, ApiError> {
    let sessions = state.chat_service.list_sessions(&auth, workspace_id).await?;
    Ok(Json(ApiResponse::ok(sessions)))
}

/// POST /api/workspaces/{workspace_id}/chat/sessions
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(workspace_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<CreateSessionBody>,
) -> Result<Json<ApiResponse<ChatSession>>, ApiError> {
    let session = state
        .chat_service
        .create_session(&auth, workspace_id, body.title)
        .await?;
    Ok(Json(ApiResponse::ok(session)))
}

/// DELETE /api/workspaces/{workspace_id}/chat/sessions/{session_id}
pub async fn delete_session(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((workspace_id, session_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .chat_service
        .delete_session(&auth, workspace_id, session_id)
        .await?;
    Ok(Json(ApiResponse::empty()))
}

/// GET /api/workspaces/{workspace_id}/chat/sessions/{session_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((workspace_id, session_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, ApiError> {
    let messages = state
        .chat_service
        .list_messages(&auth, workspace_id, session_id)
        .await?;
    Ok(Json(ApiResponse::ok(messages)))
}

/// POST /api/workspaces/{workspace_id}/chat/sessions/{session_id}/messages
///
/// Errors found before streaming starts are returned as ordinary JSON
/// responses; later failures arrive as an `error` event.
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((workspace_id, session_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<SendMessageBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let rx = state
        .chat_service
        .send_message(&auth, workspace_id, session_id, body.into())
        .await?;

    let stream = ReceiverStream::new(rx).map(|event| Ok(to_sse_event(&event)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: &ChatEvent) -> Event {
    let frame = Event::default().event(event.name());
    match serde_json::to_string(event) {
        Ok(json) => frame.data(json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize chat event");
            Event::default().event("error").data(
                r#"{"type":"error","message":"Failed to encode event","code":"INTERNAL_ERROR"}"#,
            )
        }
    }
}
