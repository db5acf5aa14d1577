//! Integration tests for subscriptions and the live event stream.

mod helpers;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use helpers::TestApp;

/// Open the stream behind a subscription URL.
async fn open_stream(app: &TestApp, url: &str) -> Body {
    let path = url.strip_prefix(app.config.server.base_url()).unwrap();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
    response.into_body()
}

/// Next event on the stream as `(name, data)`, or `None` if nothing
/// arrives within `wait`.
async fn next_event(body: &mut Body, wait: Duration) -> Option<(String, Value)> {
    let frame = tokio::time::timeout(wait, body.frame()).await.ok()?;
    let data = frame
        .expect("stream ended")
        .expect("stream error")
        .into_data()
        .expect("data frame");
    let text = std::str::from_utf8(&data).unwrap();

    let mut name = String::new();
    let mut payload = String::new();
    for line in text.lines() {
        if let Some(v) = line.strip_prefix("event:") {
            name = v.trim_start().to_string();
        } else if let Some(v) = line.strip_prefix("data:") {
            payload.push_str(v.trim_start());
        }
    }
    Some((name, serde_json::from_str(&payload).unwrap()))
}

const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(200);

fn entry(link: &Value) -> Value {
    json!({"shlId": link["id"], "managementToken": link["managementToken"]})
}

async fn subscribe(app: &TestApp, entries: Value) -> String {
    let response = app.request("POST", "/api/subscribe", Some(entries), None).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let url = response.body["subscribe"].as_str().unwrap().to_string();
    assert!(url.starts_with("http://shl.test/api/subscribe/"));
    url
}

#[tokio::test]
async fn test_connection_event_reaches_only_matching_session() {
    let app = TestApp::new().await;
    let a = app.create_link("alice", json!({"label": "A"})).await;
    let b = app.create_link("alice", json!({"label": "B"})).await;
    let c = app.create_link("carol", json!({})).await;

    let ab_url = subscribe(&app, json!([entry(&a), entry(&b)])).await;
    let c_url = subscribe(&app, json!([entry(&c)])).await;
    let mut ab = open_stream(&app, &ab_url).await;
    let mut only_c = open_stream(&app, &c_url).await;

    let mut status_ids = Vec::new();
    for _ in 0..2 {
        let (name, data) = next_event(&mut ab, WAIT).await.expect("status event");
        assert_eq!(name, "status");
        assert_eq!(data["active"], true);
        status_ids.push(data["id"].clone());
    }
    assert_eq!(status_ids, vec![a["id"].clone(), b["id"].clone()]);
    let (name, _) = next_event(&mut only_c, WAIT).await.expect("status event");
    assert_eq!(name, "status");

    let a_id = a["id"].as_str().unwrap();
    let manifest = app.manifest(a_id, json!({"recipient": "Dr. Who"})).await;
    assert_eq!(manifest.status, StatusCode::OK);

    let (name, data) = next_event(&mut ab, WAIT).await.expect("connection event");
    assert_eq!(name, "connection");
    assert_eq!(data["shlId"], a["id"]);
    assert_eq!(data["recipient"], "Dr. Who");

    assert!(next_event(&mut only_c, QUIET).await.is_none());
}

#[tokio::test]
async fn test_denied_manifest_publishes_nothing() {
    let app = TestApp::new().await;
    let a = app.create_link("alice", json!({"passcode": "1234"})).await;
    let url = subscribe(&app, json!([entry(&a)])).await;
    let mut stream = open_stream(&app, &url).await;
    next_event(&mut stream, WAIT).await.expect("status event");

    let a_id = a["id"].as_str().unwrap();
    let denied = app
        .manifest(a_id, json!({"recipient": "r", "passcode": "wrong"}))
        .await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
    assert!(next_event(&mut stream, QUIET).await.is_none());
}

#[tokio::test]
async fn test_unauthorized_entries_are_dropped() {
    let app = TestApp::new().await;
    let a = app.create_link("alice", json!({})).await;
    let b = app.create_link("bob", json!({})).await;

    let forged = json!({"shlId": b["id"], "managementToken": a["managementToken"]});
    let url = subscribe(&app, json!([entry(&a), forged])).await;
    let mut stream = open_stream(&app, &url).await;

    let (_, status) = next_event(&mut stream, WAIT).await.expect("status event");
    assert_eq!(status["id"], a["id"]);

    app.manifest(b["id"].as_str().unwrap(), json!({"recipient": "r"}))
        .await;
    assert!(next_event(&mut stream, QUIET).await.is_none());
}

#[tokio::test]
async fn test_subscribe_without_valid_token_is_unauthorized() {
    let app = TestApp::new().await;
    let a = app.create_link("alice", json!({})).await;

    let response = app
        .request(
            "POST",
            "/api/subscribe",
            Some(json!([{"shlId": a["id"], "managementToken": "guess"}])),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_subscription_ticket_is_unauthorized() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/subscribe/bogus", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_reports_watched_links() {
    let app = TestApp::new().await;
    let a = app.create_link("alice", json!({})).await;
    let url = subscribe(&app, json!([entry(&a)])).await;
    let stream = open_stream(&app, &url).await;

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
    assert_eq!(health.body["watched_links"], 1);

    drop(stream);
    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.body["watched_links"], 0);
}
