//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use healthlink_api::{AppState, build_app};
use healthlink_core::config::AppConfig;
use healthlink_core::result::AppResult;
use healthlink_database::DatabasePool;
use healthlink_entity::endpoint::{AccessTokenResponse, OAuthConfig};
use healthlink_service::TokenClient;

/// Header the test config trusts to name the caller.
pub const USER_HEADER: &str = "x-user-id";

/// Token endpoint stand-in that counts refreshes and rotates the refresh
/// token on every call.
#[derive(Debug, Default)]
pub struct FakeTokenClient {
    pub calls: AtomicUsize,
}

impl FakeTokenClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenClient for FakeTokenClient {
    async fn refresh(&self, config: &OAuthConfig) -> AppResult<AccessTokenResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let mut extra = serde_json::Map::new();
        extra.insert("patient".into(), json!("patient-1"));
        Ok(AccessTokenResponse {
            access_token: format!("access-{n}"),
            scope: Some("patient/*.read".into()),
            refresh_token: Some(format!("{}-{n}", config.refresh_token)),
            extra,
        })
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Fake OAuth token endpoint
    pub tokens: Arc<FakeTokenClient>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application over a private in-memory database.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the default config.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.server.public_url = "http://shl.test".into();
        config.auth.trusted_user_header = Some(USER_HEADER.into());
        adjust(&mut config);

        let db = DatabasePool::in_memory()
            .await
            .expect("Failed to open test database");
        let tokens = Arc::new(FakeTokenClient::default());
        let state =
            AppState::new(config.clone(), db, tokens.clone()).expect("Failed to build state");

        Self {
            router: build_app(state),
            tokens,
            config,
        }
    }

    /// Send a request and collect the whole response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }

    /// JSON request, optionally on behalf of `user`.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        if let Some(user) = user {
            req = req.header(USER_HEADER, user);
        }

        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// Request authenticated with a management token as bearer.
    pub async fn request_with_token(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: &str,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::from(body_str))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Create a link for `user` and return its flattened owner view.
    pub async fn create_link(&self, user: &str, config: Value) -> Value {
        let response = self.request("POST", "/api/shl", Some(config), Some(user)).await;
        assert_eq!(response.status, StatusCode::OK, "create failed: {:?}", response.body);
        response.body
    }

    /// Upload raw content to a link.
    pub async fn add_file(&self, user: &str, link_id: &str, content: &[u8]) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri(format!("/api/shl/{link_id}/file"))
            .header("Content-Type", "application/smart-health-card")
            .header(USER_HEADER, user)
            .body(Body::from(content.to_vec()))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Request a manifest.
    pub async fn manifest(&self, link_id: &str, body: Value) -> TestResponse {
        self.request("POST", &format!("/api/shl/{link_id}"), Some(body), None)
            .await
    }

    /// GET a ticketed location from a manifest.
    pub async fn fetch(&self, location: &str) -> TestResponse {
        let path = location
            .strip_prefix(self.config.server.base_url())
            .expect("location on public url");
        self.request("GET", path, None, None).await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub bytes: Bytes,
    /// Body parsed as JSON, or `Null`
    pub body: Value,
}

/// Location strings of a manifest response.
pub fn locations(manifest: &Value) -> Vec<String> {
    manifest["files"]
        .as_array()
        .expect("files array")
        .iter()
        .map(|f| f["location"].as_str().expect("location").to_string())
        .collect()
}

/// Replace the ticket of a location.
pub fn with_ticket(location: &str, ticket: &str) -> String {
    let base = location.split("?ticket=").next().expect("location");
    format!("{base}?ticket={ticket}")
}

/// The ticket query value of a location.
pub fn ticket_of(location: &str) -> String {
    location
        .split("?ticket=")
        .nth(1)
        .expect("ticket in location")
        .to_string()
}
