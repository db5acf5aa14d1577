//! Integration tests for the recipient flow: manifest, passcode gate,
//! ticketed file and endpoint resolution.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, locations, ticket_of, with_ticket};

const GONE: &str = "SHL does not exist or has been deactivated.";

#[tokio::test]
async fn test_wrong_then_right_passcode() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({"passcode": "1234"})).await;
    let id = link["id"].as_str().unwrap();
    assert_eq!(app.add_file("alice", id, b"encrypted-card").await.status, StatusCode::OK);

    let denied = app
        .manifest(id, json!({"recipient": "Dr. B", "passcode": "wrong"}))
        .await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
    assert_eq!(denied.body["details"]["remainingAttempts"], 4);

    let granted = app
        .manifest(id, json!({"recipient": "Dr. B", "passcode": "1234"}))
        .await;
    assert_eq!(granted.status, StatusCode::OK);
    assert!(granted.headers.contains_key("expires"));
    let locations = locations(&granted.body);
    assert_eq!(locations.len(), 1);
    assert_eq!(granted.body["files"][0]["contentType"], "application/smart-health-card");

    let file = app.fetch(&locations[0]).await;
    assert_eq!(file.status, StatusCode::OK);
    assert_eq!(file.headers["content-type"], "application/jose");
    assert_eq!(&file.bytes[..], b"encrypted-card");

    // The ticket stays valid for repeated fetches.
    assert_eq!(app.fetch(&locations[0]).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_passcode_reports_attempts_without_spending_one() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({"passcode": "1234"})).await;
    let id = link["id"].as_str().unwrap();

    for _ in 0..3 {
        let response = app.manifest(id, json!({"recipient": "r"})).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["details"]["remainingAttempts"], 5);
    }
}

#[tokio::test]
async fn test_lockout_never_goes_negative_and_reactivation_restores() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({"passcode": "1234"})).await;
    let id = link["id"].as_str().unwrap();

    for expected in (0..5).rev() {
        let response = app
            .manifest(id, json!({"recipient": "r", "passcode": "nope"}))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["details"]["remainingAttempts"], expected);
    }

    let sixth = app
        .manifest(id, json!({"recipient": "r", "passcode": "nope"}))
        .await;
    assert_eq!(sixth.body["details"]["remainingAttempts"], 0);

    // Locked: even the right passcode is refused.
    let locked = app
        .manifest(id, json!({"recipient": "r", "passcode": "1234"}))
        .await;
    assert_eq!(locked.status, StatusCode::UNAUTHORIZED);
    assert_eq!(locked.body["details"]["remainingAttempts"], 0);

    let reactivated = app
        .request("PUT", &format!("/api/shl/{id}/reactivate"), None, Some("alice"))
        .await;
    assert_eq!(reactivated.status, StatusCode::OK);
    assert_eq!(reactivated.body, json!(true));

    let wrong = app
        .manifest(id, json!({"recipient": "r", "passcode": "nope"}))
        .await;
    assert_eq!(wrong.body["details"]["remainingAttempts"], 4);
    let granted = app
        .manifest(id, json!({"recipient": "r", "passcode": "1234"}))
        .await;
    assert_eq!(granted.status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_recipient_is_bad_request() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({})).await;
    let id = link["id"].as_str().unwrap();

    let response = app.manifest(id, json!({"passcode": "x"})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Missing recipient in request body");

    let empty = app.request("POST", &format!("/api/shl/{id}"), None, None).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_deactivated_and_expired_look_the_same() {
    let app = TestApp::new().await;
    let deactivated = app.create_link("alice", json!({"passcode": "1234"})).await;
    let deactivated_id = deactivated["id"].as_str().unwrap();
    app.request("DELETE", &format!("/api/shl/{deactivated_id}"), None, Some("alice"))
        .await;
    let expired = app.create_link("alice", json!({"exp": 1_000_000})).await;
    let expired_id = expired["id"].as_str().unwrap();

    let body = json!({"recipient": "r", "passcode": "1234"});
    let responses = [
        app.manifest("no-such-link", body.clone()).await,
        app.manifest(deactivated_id, body.clone()).await,
        app.manifest(expired_id, body).await,
    ];
    for response in &responses {
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["message"], GONE);
    }
    assert_eq!(responses[0].body, responses[1].body);
    assert_eq!(responses[1].body, responses[2].body);
}

#[tokio::test]
async fn test_ticket_is_bound_to_its_link() {
    let app = TestApp::new().await;
    let a = app.create_link("alice", json!({})).await;
    let b = app.create_link("bob", json!({})).await;
    let (a_id, b_id) = (a["id"].as_str().unwrap(), b["id"].as_str().unwrap());
    app.add_file("alice", a_id, b"shared bytes").await;
    app.add_file("bob", b_id, b"shared bytes").await;

    let a_manifest = app.manifest(a_id, json!({"recipient": "r"})).await;
    let b_manifest = app.manifest(b_id, json!({"recipient": "r"})).await;
    let a_location = &locations(&a_manifest.body)[0];
    let b_location = &locations(&b_manifest.body)[0];

    // Same content, same hash, one blob.
    let hash_of = |loc: &str| loc.split("/file/").nth(1).unwrap().split('?').next().unwrap().to_string();
    assert_eq!(hash_of(a_location), hash_of(b_location));

    let cross = with_ticket(b_location, &ticket_of(a_location));
    assert_eq!(app.fetch(&cross).await.status, StatusCode::UNAUTHORIZED);

    let bare = a_location.split('?').next().unwrap();
    assert_eq!(app.fetch(bare).await.status, StatusCode::UNAUTHORIZED);

    let forged = with_ticket(a_location, "not-a-ticket");
    assert_eq!(app.fetch(&forged).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_embedded_content_follows_the_smaller_limit() {
    let app = TestApp::with_config(|c| c.storage.embedded_length_max = 16).await;
    let link = app.create_link("alice", json!({})).await;
    let id = link["id"].as_str().unwrap();
    app.add_file("alice", id, b"small.jwe").await;
    app.add_file("alice", id, b"this one is well past sixteen bytes").await;

    let manifest = app
        .manifest(id, json!({"recipient": "r", "embeddedLengthMax": 1_000_000}))
        .await;
    let files = manifest.body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    let embedded: Vec<_> = files.iter().filter_map(|f| f["embedded"].as_str()).collect();
    assert_eq!(embedded, vec!["small.jwe"]);

    let none = app
        .manifest(id, json!({"recipient": "r", "embeddedLengthMax": 0}))
        .await;
    assert!(
        none.body["files"]
            .as_array()
            .unwrap()
            .iter()
            .all(|f| f.get("embedded").is_none())
    );
}

fn endpoint_body() -> serde_json::Value {
    json!({
        "endpointUrl": "https://fhir.example.org/r4",
        "config": {
            "key": "aGVhbHRobGluay1pbnRlZ3JhdGlvbi10ZXN0LWtleSE",
            "clientId": "client",
            "clientSecret": "secret",
            "tokenEndpoint": "https://auth.example.org/token",
            "refreshToken": "refresh"
        }
    })
}

#[tokio::test]
async fn test_fresh_endpoint_is_served_without_refresh() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({})).await;
    let id = link["id"].as_str().unwrap();

    let added = app
        .request("POST", &format!("/api/shl/{id}/endpoint"), Some(endpoint_body()), Some("alice"))
        .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(app.tokens.calls(), 1);

    let manifest = app.manifest(id, json!({"recipient": "r"})).await;
    assert_eq!(manifest.body["files"][0]["contentType"], "application/smart-api-access");
    let location = &locations(&manifest.body)[0];
    assert!(location.contains("/endpoint/"));

    let payload = app.fetch(location).await;
    assert_eq!(payload.status, StatusCode::OK);
    assert_eq!(payload.headers["content-type"], "application/jose");
    let jwe = String::from_utf8(payload.bytes.to_vec()).unwrap();
    assert_eq!(jwe.split('.').count(), 5);
    assert_eq!(app.tokens.calls(), 1);
}

#[tokio::test]
async fn test_stale_endpoint_refreshes_exactly_once_per_resolution() {
    // Tokens go stale the moment they are stored.
    let app = TestApp::with_config(|c| c.endpoints.token_lifetime_seconds = 0).await;
    let link = app.create_link("alice", json!({})).await;
    let id = link["id"].as_str().unwrap();
    app.request("POST", &format!("/api/shl/{id}/endpoint"), Some(endpoint_body()), Some("alice"))
        .await;
    assert_eq!(app.tokens.calls(), 1);

    let manifest = app.manifest(id, json!({"recipient": "r"})).await;
    let location = &locations(&manifest.body)[0];

    let payload = app.fetch(location).await;
    assert_eq!(payload.status, StatusCode::OK);
    assert_eq!(app.tokens.calls(), 2);
}

#[tokio::test]
async fn test_unknown_file_with_valid_ticket_is_not_found() {
    let app = TestApp::new().await;
    let link = app.create_link("alice", json!({})).await;
    let id = link["id"].as_str().unwrap();
    app.add_file("alice", id, b"x").await;

    let manifest = app.manifest(id, json!({"recipient": "r"})).await;
    let ticket = ticket_of(&locations(&manifest.body)[0]);
    let response = app
        .request("GET", &format!("/api/shl/{id}/file/missing?ticket={ticket}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
