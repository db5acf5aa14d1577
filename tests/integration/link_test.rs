//! Integration tests for owner-side link management.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use helpers::{TestApp, USER_HEADER};

#[tokio::test]
async fn test_create_returns_flat_owner_view() {
    let app = TestApp::new().await;
    let link = app
        .create_link("alice", json!({"passcode": "1234", "label": "Vaccines", "exp": 4_102_444_800_i64}))
        .await;

    let id = link["id"].as_str().unwrap();
    assert!(id.len() >= 32);
    assert_eq!(link["key"].as_str().unwrap().len(), 43);
    assert_eq!(link["flag"], "P");
    assert_eq!(link["label"], "Vaccines");
    assert_eq!(link["v"], 1);
    assert_eq!(link["exp"], 4_102_444_800_i64);
    assert_eq!(link["passcode"], "1234");
    assert_eq!(link["url"], format!("http://shl.test/api/shl/{id}"));
    assert!(link.get("config").is_none());
    assert!(!link["managementToken"].as_str().unwrap().is_empty());
    assert!(link["shlink"].as_str().unwrap().starts_with("shlink:/"));
    assert_eq!(link["files"], json!([]));
}

#[tokio::test]
async fn test_caller_is_required() {
    let app = TestApp::new().await;
    let response = app.request("POST", "/api/shl", Some(json!({})), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request_with_token("GET", "/api/user", None, "not-a-management-token")
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_management_token_identifies_owner() {
    let app = TestApp::new().await;
    let first = app.create_link("alice", json!({})).await;
    let second = app.create_link("alice", json!({})).await;
    app.create_link("bob", json!({})).await;

    let token = first["managementToken"].as_str().unwrap();
    let listed = app.request_with_token("GET", "/api/user", None, token).await;
    assert_eq!(listed.status, StatusCode::OK);
    let mut ids: Vec<_> = listed.body.as_array().unwrap().iter().map(|l| l["id"].clone()).collect();
    ids.sort_by_key(|v| v.as_str().unwrap().to_string());
    let mut expected = vec![first["id"].clone(), second["id"].clone()];
    expected.sort_by_key(|v| v.as_str().unwrap().to_string());
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_unknown_user_has_no_links() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/user", None, Some("nobody")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_other_owner_is_unauthorized() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({})).await;
    let id = link["id"].as_str().unwrap();

    let response = app
        .request("PUT", &format!("/api/shl/{id}"), Some(json!({"label": "mine"})), Some("mallory"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.add_file("mallory", id, b"x").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_merges_and_keeps_flag_idempotent() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({"label": "Labs"})).await;
    let id = link["id"].as_str().unwrap();
    assert_eq!(link["flag"], "");

    let path = format!("/api/shl/{id}");
    let updated = app
        .request("PUT", &path, Some(json!({"passcode": "9999"})), Some("alice"))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["flag"], "P");
    assert_eq!(updated.body["label"], "Labs");

    let again = app
        .request("PUT", &path, Some(json!({"exp": 4_102_444_800_i64})), Some("alice"))
        .await;
    assert_eq!(again.body["flag"], "P");
    assert_eq!(again.body["passcode"], "9999");
    assert_eq!(again.body["exp"], 4_102_444_800_i64);

    let cleared = app
        .request("PUT", &path, Some(json!({"passcode": ""})), Some("alice"))
        .await;
    assert_eq!(cleared.body["flag"], "");
}

#[tokio::test]
async fn test_deactivate_and_reactivate() {
    let app = TestApp::new().await;
    let keep = app.create_link("alice", json!({})).await;
    let gone = app.create_link("alice", json!({})).await;
    let gone_id = gone["id"].as_str().unwrap();

    let remaining = app
        .request("DELETE", &format!("/api/shl/{gone_id}"), None, Some("alice"))
        .await;
    assert_eq!(remaining.status, StatusCode::OK);
    let remaining = remaining.body.as_array().unwrap().clone();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["id"], keep["id"]);

    let active = app
        .request("GET", &format!("/api/shl/{gone_id}/active"), None, None)
        .await;
    assert_eq!(active.body, json!(false));

    // Mutations on an inactive link look like it does not exist.
    let update = app
        .request("PUT", &format!("/api/shl/{gone_id}"), Some(json!({"label": "x"})), Some("alice"))
        .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let reactivated = app
        .request("PUT", &format!("/api/shl/{gone_id}/reactivate"), None, Some("alice"))
        .await;
    assert_eq!(reactivated.body, json!(true));
    let active = app
        .request("GET", &format!("/api/shl/{gone_id}/active"), None, None)
        .await;
    assert_eq!(active.body, json!(true));
}

#[tokio::test]
async fn test_active_status_of_unknown_link_is_not_found() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/shl/unknown/active", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_lifecycle() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({})).await;
    let id = link["id"].as_str().unwrap();

    let labelled = Request::builder()
        .method("POST")
        .uri(format!("/api/shl/{id}/file"))
        .header("Content-Type", "application/fhir+json")
        .header("x-file-label", "Allergies")
        .header(USER_HEADER, "alice")
        .body(Body::from("first"))
        .unwrap();
    let added = app.send(labelled).await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.body["files"][0]["label"], "Allergies");
    assert_eq!(added.body["files"][0]["contentType"], "application/fhir+json");

    // Re-adding identical content is idempotent.
    app.add_file("alice", id, b"second").await;
    let again = app.add_file("alice", id, b"second").await;
    let files = again.body["files"].as_array().unwrap().clone();
    assert_eq!(files.len(), 2);

    let hash = added.body["files"][0]["contentHash"].as_str().unwrap().to_string();
    let removed = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/shl/{id}/file"))
                .header(USER_HEADER, "alice")
                .body(Body::from(hash))
                .unwrap(),
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["files"].as_array().unwrap().len(), 1);

    let cleared = app
        .request("DELETE", &format!("/api/shl/{id}/files"), None, Some("alice"))
        .await;
    assert_eq!(cleared.body["files"], json!([]));
}

#[tokio::test]
async fn test_upload_requires_content_type() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({})).await;
    let id = link["id"].as_str().unwrap();

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri(format!("/api/shl/{id}/file"))
                .header(USER_HEADER, "alice")
                .body(Body::from("x"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::with_config(|c| c.storage.file_size_max_bytes = 8).await;
    let link = app.create_link("alice", json!({})).await;
    let id = link["id"].as_str().unwrap();

    assert_eq!(app.add_file("alice", id, b"12345678").await.status, StatusCode::OK);
    let response = app.add_file("alice", id, b"123456789").await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_access_log_lists_recipients_newest_first() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({})).await;
    let id = link["id"].as_str().unwrap();

    app.manifest(id, json!({"recipient": "First Clinic"})).await;
    app.manifest(id, json!({"recipient": "Second Clinic"})).await;

    let log = app
        .request("GET", &format!("/api/shl/{id}/access"), None, Some("alice"))
        .await;
    assert_eq!(log.status, StatusCode::OK);
    let entries = log.body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["recipient"], "Second Clinic");
    assert_eq!(entries[0]["linkId"], id);
}
