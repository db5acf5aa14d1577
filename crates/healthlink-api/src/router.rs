//! Route definitions for the HealthLink HTTP API.
//!
//! All routes are organized by audience and mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with every route and the upload size limit.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.file_size_max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(1);

    let api_routes = Router::new()
        .merge(recipient_routes())
        .merge(owner_routes())
        .merge(subscription_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state)
}

/// Manifest, ticketed resolution, and the public status query.
fn recipient_routes() -> Router<AppState> {
    Router::new()
        .route("/shl/{id}", post(handlers::manifest::request_manifest))
        .route("/shl/{id}/file/{hash}", get(handlers::manifest::fetch_file))
        .route(
            "/shl/{id}/endpoint/{endpoint_id}",
            get(handlers::manifest::fetch_endpoint),
        )
        .route("/shl/{id}/active", get(handlers::manifest::is_active))
}

/// Link management by the owner.
fn owner_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user",
            get(handlers::link::list_links).post(handlers::link::list_links),
        )
        .route("/shl", post(handlers::link::create_link))
        .route(
            "/shl/{id}",
            put(handlers::link::update_link).delete(handlers::link::deactivate_link),
        )
        .route("/shl/{id}/reactivate", put(handlers::link::reactivate_link))
        .route(
            "/shl/{id}/file",
            post(handlers::link::add_file).delete(handlers::link::remove_file),
        )
        .route("/shl/{id}/files", delete(handlers::link::remove_all_files))
        .route("/shl/{id}/endpoint", post(handlers::link::add_endpoint))
        .route("/shl/{id}/access", get(handlers::link::access_log))
}

/// Subscription tickets and the live event stream.
fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(handlers::subscription::subscribe))
        .route("/subscribe/{ticket}", get(handlers::subscription::stream))
}

/// Liveness and dependency status.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
