//! Integration tests for chat sessions and the reply event stream.

mod helpers;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use dochub_assistant::{AssistantBackend, AssistantRequest, DeltaStream};
use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use helpers::{TestApp, parse_sse};

fn sessions(ws: Uuid) -> String {
    format!("/api/workspaces/{ws}/chat/sessions")
}

fn messages(ws: Uuid, sid: Uuid) -> String {
    format!("/api/workspaces/{ws}/chat/sessions/{sid}/messages")
}

async fn new_session(app: &TestApp, token: &str, ws: Uuid) -> Uuid {
    let response = app
        .request("POST", &sessions(ws), Some(json!({})), Some(token))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.id()
}

#[derive(Debug)]
struct Overloaded;

#[async_trait]
impl AssistantBackend for Overloaded {
    fn name(&self) -> &'static str {
        "overloaded"
    }

    async fn stream(&self, _request: AssistantRequest) -> AppResult<DeltaStream> {
        Err(AppError::external_service("Upstream is overloaded"))
    }
}

#[tokio::test]
async fn test_session_crud() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    let named = app
        .request(
            "POST",
            &sessions(ws),
            Some(json!({ "title": "Schema questions" })),
            Some(&token),
        )
        .await;
    assert_eq!(named.data()["title"], "Schema questions");
    let default_title = new_session(&app, &token, ws).await;

    let listed = app.request("GET", &sessions(ws), None, Some(&token)).await;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(2));

    let deleted = app
        .request(
            "DELETE",
            &format!("{}/{default_title}", sessions(ws)),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(deleted.body, json!({ "success": true }));

    let history = app
        .request("GET", &messages(ws, default_title), None, Some(&token))
        .await;
    assert_eq!(history.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_streams_events_in_order() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;
    let sid = new_session(&app, &token, ws).await;

    let response = app
        .request_raw(
            "POST",
            &messages(ws, sid),
            Some(json!({
                "message": "How are tables named?",
                "context": { "current_directory": "/" },
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.content_type.starts_with("text/event-stream"));

    let events = parse_sse(&response.text);
    let names: Vec<&str> = events.iter().map(|e| e.event.as_str()).collect();
    assert_eq!(names.first(), Some(&"investigation_start"));
    assert_eq!(names.get(1), Some(&"message_start"));
    assert_eq!(names.last(), Some(&"message_complete"));
    assert!(names[2..names.len() - 1].iter().all(|n| *n == "content_delta"));

    assert_eq!(events[0].data["session_id"], sid.to_string());
    let message_id = events[1].data["message_id"].clone();
    let streamed: String = events
        .iter()
        .filter(|e| e.event == "content_delta")
        .filter_map(|e| e.data["delta"].as_str())
        .collect();
    assert_eq!(streamed, "Echo: How are tables named?");

    let complete = &events[events.len() - 1].data;
    assert_eq!(complete["message_id"], message_id);
    assert_eq!(complete["content"], streamed.as_str());

    let history = app
        .request("GET", &messages(ws, sid), None, Some(&token))
        .await;
    let stored = history.data().as_array().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0]["role"], "user");
    assert_eq!(stored[0]["content"], "How are tables named?");
    assert_eq!(stored[0]["metadata"]["context"]["current_directory"], "/");
    assert_eq!(stored[1]["role"], "assistant");
    assert_eq!(stored[1]["id"], message_id);
    assert_eq!(stored[1]["content"], streamed.as_str());
}

#[tokio::test]
async fn test_history_is_replayed() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;
    let sid = new_session(&app, &token, ws).await;

    for message in ["first", "second"] {
        let response = app
            .request_raw(
                "POST",
                &messages(ws, sid),
                Some(json!({ "message": message })),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let history = app
        .request("GET", &messages(ws, sid), None, Some(&token))
        .await;
    let contents: Vec<&str> = history
        .data()
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["content"].as_str())
        .collect();
    assert_eq!(
        contents,
        vec!["first", "Echo: first", "second", "Echo: second"]
    );
}

#[tokio::test]
async fn test_upstream_error_event() {
    let app = TestApp::with_backend(Arc::new(Overloaded)).await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;
    let sid = new_session(&app, &token, ws).await;

    let response = app
        .request_raw(
            "POST",
            &messages(ws, sid),
            Some(json!({ "message": "hello" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let events = parse_sse(&response.text);
    let last = events.last().unwrap();
    assert_eq!(last.event, "error");
    assert_eq!(last.data["code"], "UPSTREAM_ERROR");
    assert_eq!(last.data["message"], "Upstream is overloaded");
    assert!(!events.iter().any(|e| e.event == "message_complete"));
}

#[tokio::test]
async fn test_send_rejections_are_json() {
    let app = TestApp::new().await;
    let (_, owner) = app.new_user();
    let (_, stranger) = app.new_user();
    let ws = app.create_workspace(&owner, "Docs").await;
    let sid = new_session(&app, &owner, ws).await;

    let empty = app
        .request(
            "POST",
            &messages(ws, sid),
            Some(json!({ "message": "" })),
            Some(&owner),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.error_code(), "VALIDATION_ERROR");

    let unknown = app
        .request(
            "POST",
            &messages(ws, Uuid::new_v4()),
            Some(json!({ "message": "hi" })),
            Some(&owner),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let foreign = app
        .request(
            "POST",
            &messages(ws, sid),
            Some(json!({ "message": "hi" })),
            Some(&stranger),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let anonymous = app
        .request("POST", &messages(ws, sid), Some(json!({ "message": "hi" })), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_concurrent_send_conflicts() {
    use axum::body::Body;
    use axum::http::Request;
    use dochub_assistant::EchoBackend;
    use std::time::Duration;
    use tower::ServiceExt;

    let app = TestApp::with_backend(Arc::new(EchoBackend::with_delay(Duration::from_millis(
        50,
    ))))
    .await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;
    let sid = new_session(&app, &token, ws).await;

    // The handler returns once streaming has started; the body stays open.
    let first = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(messages(ws, sid))
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::from(r#"{"message":"one two three four"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .request(
            "POST",
            &messages(ws, sid),
            Some(json!({ "message": "again" })),
            Some(&token),
        )
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_code(), "ALREADY_EXISTS");

    let body = axum::body::to_bytes(first.into_body(), usize::MAX)
        .await
        .unwrap();
    let events = parse_sse(&String::from_utf8_lossy(&body));
    assert_eq!(events.last().map(|e| e.event.as_str()), Some("message_complete"));
}
