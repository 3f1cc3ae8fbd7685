//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use dochub_api::{AppState, build_app};
use dochub_assistant::{AssistantBackend, EchoBackend};
use dochub_auth::JwtEncoder;
use dochub_core::config::AppConfig;
use dochub_database::Store;

/// Secret shared by the test encoder and the app under test.
pub const TEST_SECRET: &str = "integration-test-secret";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
}

impl TestApp {
    /// App on the in-memory store with the echo assistant.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// App with adjusted configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        Self::build(adjust, Arc::new(EchoBackend::new())).await
    }

    /// App with a specific assistant backend.
    pub async fn with_backend(backend: Arc<dyn AssistantBackend>) -> Self {
        Self::build(|_| {}, backend).await
    }

    async fn build(adjust: impl FnOnce(&mut AppConfig), backend: Arc<dyn AssistantBackend>) -> Self {
        let mut config = AppConfig::default();
        config.database.provider = "memory".to_string();
        config.assistant.provider = "echo".to_string();
        config.auth.jwt_secret = TEST_SECRET.to_string();
        adjust(&mut config);

        let store = Store::connect(&config.database)
            .await
            .expect("Failed to build memory store");
        let encoder = JwtEncoder::new(&config.auth);
        let router = build_app(AppState::new(config.clone(), store, backend));

        Self {
            router,
            config,
            encoder,
        }
    }

    /// Access token for a fresh user.
    pub fn new_user(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        (user_id, self.token_for(user_id))
    }

    /// Access token for a given user, valid for an hour.
    pub fn token_for(&self, user_id: Uuid) -> String {
        self.encoder
            .issue(
                user_id,
                Some(format!("{user_id}@example.com")),
                chrono::Duration::hours(1),
            )
            .expect("Failed to mint token")
    }

    /// Make an HTTP request to the test app and parse the JSON body.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let raw = self.request_raw(method, path, body, token).await;
        let body: Value = serde_json::from_str(&raw.text).unwrap_or(Value::Null);
        TestResponse {
            status: raw.status,
            body,
        }
    }

    /// Make an HTTP request and keep the body as text.
    pub async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> RawResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.send(method, path, body_str, token).await
    }

    /// Make an HTTP request with a pre-encoded JSON body.
    pub async fn request_text(
        &self,
        method: &str,
        path: &str,
        body: String,
        token: Option<&str>,
    ) -> TestResponse {
        let raw = self.send(method, path, body, token).await;
        let body: Value = serde_json::from_str(&raw.text).unwrap_or(Value::Null);
        TestResponse {
            status: raw.status,
            body,
        }
    }

    async fn send(&self, method: &str, path: &str, body_str: String, token: Option<&str>) -> RawResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body_bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        RawResponse {
            status,
            content_type,
            text: String::from_utf8_lossy(&body_bytes).into_owned(),
        }
    }

    /// Create a workspace and return its ID.
    pub async fn create_workspace(&self, token: &str, name: &str) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/workspaces",
                Some(serde_json::json!({ "name": name })),
                Some(token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Workspace creation failed: {:?}",
            response.body
        );
        response.id()
    }

    /// Create a documentation item and return the response.
    pub async fn create_item(&self, token: &str, workspace_id: Uuid, body: Value) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/workspaces/{workspace_id}/documents"),
            Some(body),
            Some(token),
        )
        .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error.code` field of an error envelope.
    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }

    /// The `data.id` field, parsed.
    pub fn id(&self) -> Uuid {
        self.data()["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("No data.id in response")
    }
}

/// Unparsed response body.
#[derive(Debug)]
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: String,
    /// Body text
    pub text: String,
}

/// One decoded Server-Sent Event.
#[derive(Debug, Clone)]
pub struct SseEvent {
    /// The `event:` field.
    pub event: String,
    /// The `data:` field parsed as JSON.
    pub data: Value,
}

/// Decode a complete `text/event-stream` body, skipping keep-alive comments.
pub fn parse_sse(text: &str) -> Vec<SseEvent> {
    text.split("\n\n")
        .filter_map(|block| {
            let mut event = None;
            let mut data = String::new();
            for line in block.lines() {
                if let Some(v) = line.strip_prefix("event:") {
                    event = Some(v.trim().to_string());
                } else if let Some(v) = line.strip_prefix("data:") {
                    data.push_str(v.trim_start());
                }
            }
            let event = event?;
            Some(SseEvent {
                event,
                data: serde_json::from_str(&data).unwrap_or(Value::Null),
            })
        })
        .collect()
}
