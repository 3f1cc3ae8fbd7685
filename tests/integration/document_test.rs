//! Integration tests for the documentation tree endpoints.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use helpers::TestApp;

fn docs(ws: Uuid) -> String {
    format!("/api/workspaces/{ws}/documents")
}

fn doc(ws: Uuid, id: Uuid) -> String {
    format!("/api/workspaces/{ws}/documents/{id}")
}

async fn tree(app: &TestApp, token: &str, ws: Uuid) -> Value {
    let response = app.request("GET", &docs(ws), None, Some(token)).await;
    assert_eq!(response.status, StatusCode::OK);
    response.data().clone()
}

#[tokio::test]
async fn test_empty_workspace_has_empty_tree() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    assert_eq!(tree(&app, &token, ws).await, json!([]));
}

#[tokio::test]
async fn test_create_rename_delete_scenario() {
    let app = TestApp::new().await;
    let (user_id, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    let folder = app
        .create_item(&token, ws, json!({ "name": "Architecture", "type": "folder" }))
        .await;
    assert_eq!(folder.status, StatusCode::OK);
    assert_eq!(folder.data()["path"], "/Architecture");
    assert_eq!(folder.data()["children"], json!([]));
    let folder_id = folder.id();

    let file = app
        .create_item(
            &token,
            ws,
            json!({
                "name": "database",
                "type": "file",
                "parent_id": folder_id,
                "fileExtension": "md",
            }),
        )
        .await;
    assert_eq!(file.status, StatusCode::OK);
    assert_eq!(file.data()["name"], "database.md");
    assert_eq!(file.data()["path"], "/Architecture/database.md");
    assert_eq!(file.data()["content"], "# database\n\n");
    assert_eq!(file.data()["metadata"]["mimeType"], "text/markdown");
    assert_eq!(file.data()["metadata"]["created_by"], user_id.to_string());
    let file_id = file.id();

    let renamed = app
        .request(
            "PATCH",
            &doc(ws, folder_id),
            Some(json!({ "name": "Design" })),
            Some(&token),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.data()["path"], "/Design");
    assert_eq!(renamed.data()["children"][0]["path"], "/Design/database.md");

    let fetched = app
        .request("GET", &doc(ws, file_id), None, Some(&token))
        .await;
    assert_eq!(fetched.data()["path"], "/Design/database.md");
    assert!(fetched.data().get("children").is_none());

    let forest = tree(&app, &token, ws).await;
    assert_eq!(forest[0]["name"], "Design");
    assert_eq!(forest[0]["children"][0]["name"], "database.md");

    let deleted = app
        .request("DELETE", &doc(ws, folder_id), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({ "success": true }));

    assert_eq!(tree(&app, &token, ws).await, json!([]));
    let gone = app
        .request("GET", &doc(ws, file_id), None, Some(&token))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root_folders_keep_creation_order() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    let a = app
        .create_item(&token, ws, json!({ "name": "A", "type": "folder" }))
        .await;
    let b = app
        .create_item(&token, ws, json!({ "name": "B", "type": "folder" }))
        .await;
    assert_eq!(a.data()["order_index"], 0);
    assert_eq!(b.data()["order_index"], 1);

    let forest = tree(&app, &token, ws).await;
    let names: Vec<&str> = forest
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["name"].as_str())
        .collect();
    assert_eq!(names, vec!["A", "B"]);

    // Reads are idempotent.
    assert_eq!(tree(&app, &token, ws).await, forest);
}

#[tokio::test]
async fn test_traversal_name_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    let response = app
        .create_item(
            &token,
            ws,
            json!({ "name": "../etc", "type": "file", "file_extension": "md" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
    assert_eq!(tree(&app, &token, ws).await, json!([]));
}

#[tokio::test]
async fn test_duplicate_path_conflicts() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    let first = app
        .create_item(&token, ws, json!({ "name": "Guides", "type": "folder" }))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .create_item(&token, ws, json!({ "name": "Guides", "type": "folder" }))
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_code(), "ALREADY_EXISTS");
}

#[tokio::test]
async fn test_disallowed_extension_and_file_parent() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    let exe = app
        .create_item(
            &token,
            ws,
            json!({ "name": "tool", "type": "file", "file_extension": "exe" }),
        )
        .await;
    assert_eq!(exe.status, StatusCode::BAD_REQUEST);

    let readme = app
        .create_item(
            &token,
            ws,
            json!({ "name": "readme", "type": "file", "file_extension": "md" }),
        )
        .await;
    let under_file = app
        .create_item(
            &token,
            ws,
            json!({ "name": "Nested", "type": "folder", "parent_id": readme.id() }),
        )
        .await;
    assert_eq!(under_file.status, StatusCode::BAD_REQUEST);
    assert_eq!(under_file.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_move_into_descendant_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    let outer = app
        .create_item(&token, ws, json!({ "name": "Outer", "type": "folder" }))
        .await
        .id();
    let inner = app
        .create_item(
            &token,
            ws,
            json!({ "name": "Inner", "type": "folder", "parent_id": outer }),
        )
        .await
        .id();

    let response = app
        .request(
            "PATCH",
            &doc(ws, outer),
            Some(json!({ "parent_id": inner })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");

    let forest = tree(&app, &token, ws).await;
    assert_eq!(forest[0]["path"], "/Outer");
    assert_eq!(forest[0]["children"][0]["path"], "/Outer/Inner");
}

#[tokio::test]
async fn test_move_to_root_and_back() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    let guides = app
        .create_item(&token, ws, json!({ "name": "Guides", "type": "folder" }))
        .await
        .id();
    let setup = app
        .create_item(
            &token,
            ws,
            json!({ "name": "setup", "type": "file", "parent_id": guides, "file_extension": "md" }),
        )
        .await
        .id();

    let to_root = app
        .request(
            "PATCH",
            &doc(ws, setup),
            Some(json!({ "parent_id": null })),
            Some(&token),
        )
        .await;
    assert_eq!(to_root.status, StatusCode::OK);
    assert_eq!(to_root.data()["path"], "/setup.md");
    assert_eq!(to_root.data()["parent_id"], Value::Null);

    let back = app
        .request(
            "PATCH",
            &doc(ws, setup),
            Some(json!({ "parent_id": guides })),
            Some(&token),
        )
        .await;
    assert_eq!(back.status, StatusCode::OK);
    assert_eq!(back.data()["path"], "/Guides/setup.md");
}

#[tokio::test]
async fn test_reorder_siblings() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    for name in ["A", "B", "C"] {
        app.create_item(&token, ws, json!({ "name": name, "type": "folder" }))
            .await;
    }
    let forest = tree(&app, &token, ws).await;
    let c_id = forest[2]["id"].as_str().unwrap().to_string();

    let moved = app
        .request(
            "PATCH",
            &format!("/api/workspaces/{ws}/documents/{c_id}"),
            Some(json!({ "order_index": 0 })),
            Some(&token),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);

    let forest = tree(&app, &token, ws).await;
    let names: Vec<&str> = forest
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["name"].as_str())
        .collect();
    assert_eq!(names, vec!["C", "A", "B"]);

    let negative = app
        .request(
            "PATCH",
            &format!("/api/workspaces/{ws}/documents/{c_id}"),
            Some(json!({ "order_index": -3 })),
            Some(&token),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_huge_order_index_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;
    let a_id = app
        .create_item(&token, ws, json!({ "name": "A", "type": "folder" }))
        .await
        .id();

    let response = app
        .request(
            "PATCH",
            &doc(ws, a_id),
            Some(json!({ "order_index": i32::MAX })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");

    // The rejected update left ordering usable.
    let b = app
        .create_item(&token, ws, json!({ "name": "B", "type": "folder" }))
        .await;
    assert_eq!(b.status, StatusCode::OK);
    assert_eq!(b.data()["order_index"], 1);
}

#[tokio::test]
async fn test_content_update() {
    let app = TestApp::new().await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;

    let folder = app
        .create_item(&token, ws, json!({ "name": "Notes", "type": "folder" }))
        .await
        .id();
    let file = app
        .create_item(
            &token,
            ws,
            json!({ "name": "todo", "type": "file", "parent_id": folder, "file_extension": "txt" }),
        )
        .await
        .id();

    let updated = app
        .request(
            "PUT",
            &format!("{}/content", doc(ws, file)),
            Some(json!({ "content": "- ship it\n" })),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert!(updated.data()["updated_at"].is_string());

    let fetched = app.request("GET", &doc(ws, file), None, Some(&token)).await;
    assert_eq!(fetched.data()["content"], "- ship it\n");
    assert!(fetched.data()["metadata"]["last_edited"].is_string());

    let on_folder = app
        .request(
            "PUT",
            &format!("{}/content", doc(ws, folder)),
            Some(json!({ "content": "nope" })),
            Some(&token),
        )
        .await;
    assert_eq!(on_folder.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_content_rejected() {
    let app = TestApp::with_config(|c| c.documents.max_content_bytes = 16).await;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;
    let file = app
        .create_item(
            &token,
            ws,
            json!({ "name": "big", "type": "file", "file_extension": "md" }),
        )
        .await
        .id();

    let response = app
        .request(
            "PUT",
            &format!("{}/content", doc(ws, file)),
            Some(json!({ "content": "x".repeat(17) })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error_code(), "CONTENT_TOO_LARGE");
    assert_eq!(response.body["error"]["details"]["limit"], 16);

    let fetched = app.request("GET", &doc(ws, file), None, Some(&token)).await;
    assert_eq!(fetched.data()["content"], "# big\n\n");
}

/// `{"content":"\u00e9\u00e9..."}` as an ASCII-only JSON encoder writes it.
fn escaped_content_body(repeat: usize) -> String {
    format!("{{\"content\":\"{}\"}}", "\\u00e9".repeat(repeat))
}

#[tokio::test]
async fn test_escaped_content_measured_after_decoding() {
    let app = TestApp::new().await;
    let limit = app.config.documents.max_content_bytes;
    let (_, token) = app.new_user();
    let ws = app.create_workspace(&token, "Docs").await;
    let file = app
        .create_item(
            &token,
            ws,
            json!({ "name": "accents", "type": "file", "file_extension": "md" }),
        )
        .await
        .id();
    let path = format!("{}/content", doc(ws, file));

    // Each escape is six body bytes for two content bytes.
    let fits = limit / 2;
    let response = app
        .request_text("PUT", &path, escaped_content_body(fits), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let fetched = app.request("GET", &doc(ws, file), None, Some(&token)).await;
    assert_eq!(fetched.data()["content"].as_str().map(str::len), Some(fits * 2));

    let response = app
        .request_text("PUT", &path, escaped_content_body(fits + 1), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error_code(), "CONTENT_TOO_LARGE");
    assert_eq!(response.body["error"]["details"]["size"], (fits + 1) * 2);
    assert_eq!(response.body["error"]["details"]["limit"], limit);
}

#[tokio::test]
async fn test_other_users_tree_is_forbidden() {
    let app = TestApp::new().await;
    let (_, owner) = app.new_user();
    let (_, stranger) = app.new_user();
    let ws = app.create_workspace(&owner, "Docs").await;

    let read = app.request("GET", &docs(ws), None, Some(&stranger)).await;
    assert_eq!(read.status, StatusCode::FORBIDDEN);

    let write = app
        .create_item(&stranger, ws, json!({ "name": "Intruder", "type": "folder" }))
        .await;
    assert_eq!(write.status, StatusCode::FORBIDDEN);

    let missing = app
        .request("GET", &docs(Uuid::new_v4()), None, Some(&owner))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
