//! Integration tests for health, authentication, and workspaces.

mod helpers;

use axum::http::StatusCode;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_health_is_public() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["status"], "ok");
    assert!(response.data()["version"].is_string());
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/workspaces", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.error_code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_foreign_signature_is_unauthorized() {
    let app = helpers::TestApp::new().await;
    let now = chrono::Utc::now().timestamp();
    let token = encode(
        &Header::default(),
        &json!({
            "sub": Uuid::new_v4(),
            "role": "authenticated",
            "aud": "authenticated",
            "iat": now,
            "exp": now + 3600,
        }),
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let response = app
        .request("GET", "/api/workspaces", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let app = helpers::TestApp::new().await;
    let now = chrono::Utc::now().timestamp();
    let token = encode(
        &Header::default(),
        &json!({
            "sub": Uuid::new_v4(),
            "role": "authenticated",
            "aud": "authenticated",
            "iat": now - 7200,
            "exp": now - 3600,
        }),
        &EncodingKey::from_secret(helpers::TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let response = app
        .request("GET", "/api/workspaces", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_anon_role_is_unauthorized() {
    let app = helpers::TestApp::new().await;
    let now = chrono::Utc::now().timestamp();
    let token = encode(
        &Header::default(),
        &json!({
            "sub": Uuid::new_v4(),
            "role": "anon",
            "aud": "authenticated",
            "iat": now,
            "exp": now + 3600,
        }),
        &EncodingKey::from_secret(helpers::TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let response = app
        .request("GET", "/api/workspaces", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_workspace_crud() {
    let app = helpers::TestApp::new().await;
    let (user_id, token) = app.new_user();

    let created = app
        .request(
            "POST",
            "/api/workspaces",
            Some(json!({
                "name": "  Platform  ",
                "description": "Internal docs",
                "repository": "acme/platform",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.data()["name"], "Platform");
    assert_eq!(created.data()["owner_id"], user_id.to_string());
    assert_eq!(created.data()["repository"], "acme/platform");
    let ws = created.id();

    let listed = app
        .request("GET", "/api/workspaces", None, Some(&token))
        .await;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(1));

    let fetched = app
        .request("GET", &format!("/api/workspaces/{ws}"), None, Some(&token))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.data()["id"], ws.to_string());

    let deleted = app
        .request("DELETE", &format!("/api/workspaces/{ws}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({ "success": true }));

    let gone = app
        .request("GET", &format!("/api/workspaces/{ws}"), None, Some(&token))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_workspace_validation() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.new_user();

    let empty = app
        .request("POST", "/api/workspaces", Some(json!({ "name": "" })), Some(&token))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.error_code(), "VALIDATION_ERROR");

    let bad_repo = app
        .request(
            "POST",
            "/api/workspaces",
            Some(json!({ "name": "Docs", "repository": "not a slug" })),
            Some(&token),
        )
        .await;
    assert_eq!(bad_repo.status, StatusCode::BAD_REQUEST);

    let malformed = app
        .request("GET", "/api/workspaces/not-a-uuid", None, Some(&token))
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_workspaces_are_private() {
    let app = helpers::TestApp::new().await;
    let (_, owner) = app.new_user();
    let (_, stranger) = app.new_user();
    let ws = app.create_workspace(&owner, "Private").await;

    let listed = app
        .request("GET", "/api/workspaces", None, Some(&stranger))
        .await;
    assert_eq!(listed.data(), &json!([]));

    let fetched = app
        .request("GET", &format!("/api/workspaces/{ws}"), None, Some(&stranger))
        .await;
    assert_eq!(fetched.status, StatusCode::FORBIDDEN);
    assert_eq!(fetched.error_code(), "FORBIDDEN");

    let deleted = app
        .request("DELETE", &format!("/api/workspaces/{ws}"), None, Some(&stranger))
        .await;
    assert_eq!(deleted.status, StatusCode::FORBIDDEN);
}
