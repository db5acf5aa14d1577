//! Recipient-facing handlers: manifest, ticketed file and endpoint
//! resolution, and the public active-status query.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderValue;
use axum::http::header::{CONTENT_TYPE, EXPIRES};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use healthlink_core::error::AppError;
use healthlink_core::types::{ContentHash, EndpointId, LinkId};
use healthlink_entity::manifest::{CONTENT_TYPE_JOSE, ManifestRequest};

use crate::error::ApiResult;
use crate::extractors::TicketQuery;
use crate::state::AppState;

/// POST /api/shl/{id}
///
/// An empty body is a request without recipient and is rejected by the
/// service with the usual message.
pub async fn request_manifest(
    State(state): State<AppState>,
    Path(id): Path<LinkId>,
    body: Bytes,
) -> ApiResult<Response> {
    let request: ManifestRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ManifestRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::bad_request(format!("Invalid request body: {e}")))?
    };

    let manifest = state.manifests.request_manifest(&id, request).await?;

    let mut response = Json(manifest).into_response();
    // Manifests are never cacheable: every one carries a fresh ticket.
    if let Ok(now) = HeaderValue::from_str(&http_date()) {
        response.headers_mut().insert(EXPIRES, now);
    }
    Ok(response)
}

/// GET /api/shl/{id}/file/{hash}?ticket=...
pub async fn fetch_file(
    State(state): State<AppState>,
    Path((id, hash)): Path<(LinkId, ContentHash)>,
    Query(query): Query<TicketQuery>,
) -> ApiResult<Response> {
    let content = state.manifests.file(&id, &hash, query.ticket()).await?;
    Ok(([(CONTENT_TYPE, CONTENT_TYPE_JOSE)], content).into_response())
}

/// GET /api/shl/{id}/endpoint/{endpoint_id}?ticket=...
pub async fn fetch_endpoint(
    State(state): State<AppState>,
    Path((id, endpoint_id)): Path<(LinkId, EndpointId)>,
    Query(query): Query<TicketQuery>,
) -> ApiResult<Response> {
    let payload = state
        .manifests
        .endpoint(&id, &endpoint_id, query.ticket())
        .await?;
    Ok(([(CONTENT_TYPE, CONTENT_TYPE_JOSE)], payload).into_response())
}

/// GET /api/shl/{id}/active
pub async fn is_active(
    State(state): State<AppState>,
    Path(id): Path<LinkId>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.links.is_active(&id).await?))
}

fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_date_shape() {
        let date = http_date();
        assert!(date.ends_with(" GMT"));
        assert_eq!(date.split(' ').count(), 6);
    }
}
