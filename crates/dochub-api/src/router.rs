//! Route definitions for the DocHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, put};

use crate::handlers;
use crate::state::AppState;

/// Build the API router.
///
/// Middleware is layered on in [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let content_limit = content_body_limit(state.config.documents.max_content_bytes);
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(workspace_routes())
        .merge(document_routes(content_limit))
        .merge(chat_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Workspace CRUD
fn workspace_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/workspaces",
            get(handlers::workspace::list_workspaces).post(handlers::workspace::create_workspace),
        )
        .route(
            "/workspaces/{workspace_id}",
            get(handlers::workspace::get_workspace).delete(handlers::workspace::delete_workspace),
        )
}

/// Largest JSON body that can carry `max_content_bytes` of content.
///
/// A `\u0001` escape spends six body bytes on one content byte. The size
/// check on the decoded content is then the only gate.
pub fn content_body_limit(max_content_bytes: usize) -> usize {
    max_content_bytes
        .saturating_mul(6)
        .saturating_add(64 * 1024)
}

/// Documentation tree: read, create, rename/move/reorder, delete, content
fn document_routes(content_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/workspaces/{workspace_id}/documents",
            get(handlers::document::get_tree).post(handlers::document::create_item),
        )
        .route(
            "/workspaces/{workspace_id}/documents/{item_id}",
            get(handlers::document::get_item)
                .patch(handlers::document::update_item)
                .delete(handlers::document::delete_item),
        )
        .route(
            "/workspaces/{workspace_id}/documents/{item_id}/content",
            put(handlers::document::update_content).layer(DefaultBodyLimit::max(content_limit)),
        )
}

/// Chat sessions and the reply stream
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/workspaces/{workspace_id}/chat/sessions",
            get(handlers::chat::list_sessions).post(handlers::chat::create_session),
        )
        .route(
            "/workspaces/{workspace_id}/chat/sessions/{session_id}",
            delete(handlers::chat::delete_session),
        )
        .route(
            "/workspaces/{workspace_id}/chat/sessions/{session_id}/messages",
            get(handlers::chat::list_messages).post(handlers::chat::send_message),
        )
}
