//! Owner-facing link management handlers.
//!
//! Every handler here resolves the caller first; responses carry the
//! flattened owner view of the link.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;

use healthlink_core::error::AppError;
use healthlink_core::types::{ContentHash, LinkId};
use healthlink_entity::access::AccessLogEntry;
use healthlink_entity::endpoint::NewEndpoint;
use healthlink_entity::link::{LinkConfig, LinkFull, LinkFullFlat};

use crate::dto::request::new_file;
use crate::error::ApiResult;
use crate::extractors::Caller;
use crate::state::AppState;

fn flatten(links: Vec<LinkFull>) -> ApiResult<Vec<LinkFullFlat>> {
    links
        .into_iter()
        .map(|l| l.into_flat().map_err(Into::into))
        .collect()
}

/// GET /api/user
pub async fn list_links(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<LinkFullFlat>>> {
    let links = state.links.list(&caller).await?;
    Ok(Json(flatten(links)?))
}

/// POST /api/shl
pub async fn create_link(
    State(state): State<AppState>,
    caller: Caller,
    Json(config): Json<LinkConfig>,
) -> ApiResult<Json<LinkFullFlat>> {
    let link = state.links.create(&caller, config).await?;
    Ok(Json(link.into_flat()?))
}

/// PUT /api/shl/{id}
pub async fn update_link(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<LinkId>,
    Json(config): Json<LinkConfig>,
) -> ApiResult<Json<LinkFullFlat>> {
    let link = state.links.update(&caller, &id, config).await?;
    Ok(Json(link.into_flat()?))
}

/// DELETE /api/shl/{id}
pub async fn deactivate_link(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<LinkId>,
) -> ApiResult<Json<Vec<LinkFullFlat>>> {
    let remaining = state.links.deactivate(&caller, &id).await?;
    Ok(Json(flatten(remaining)?))
}

/// PUT /api/shl/{id}/reactivate
pub async fn reactivate_link(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<LinkId>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.links.reactivate(&caller, &id).await?))
}

/// POST /api/shl/{id}/file
///
/// The body is the raw, already encrypted content.
pub async fn add_file(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<LinkId>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<LinkFullFlat>> {
    let file = new_file(&headers, body.to_vec())?;
    let link = state.links.add_file(&caller, &id, file).await?;
    Ok(Json(link.into_flat()?))
}

/// DELETE /api/shl/{id}/file
///
/// The body is the content hash as plain text.
pub async fn remove_file(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<LinkId>,
    body: String,
) -> ApiResult<Json<LinkFullFlat>> {
    let hash = body.trim();
    if hash.is_empty() {
        return Err(AppError::bad_request("Missing content hash in request body").into());
    }
    let link = state
        .links
        .remove_file(&caller, &id, &ContentHash::from(hash))
        .await?;
    Ok(Json(link.into_flat()?))
}

/// DELETE /api/shl/{id}/files
pub async fn remove_all_files(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<LinkId>,
) -> ApiResult<Json<LinkFullFlat>> {
    let link = state.links.remove_all_files(&caller, &id).await?;
    Ok(Json(link.into_flat()?))
}

/// POST /api/shl/{id}/endpoint
pub async fn add_endpoint(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<LinkId>,
    Json(endpoint): Json<NewEndpoint>,
) -> ApiResult<Json<LinkFullFlat>> {
    let link = state.links.add_endpoint(&caller, &id, endpoint).await?;
    Ok(Json(link.into_flat()?))
}

/// GET /api/shl/{id}/access
pub async fn access_log(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<LinkId>,
) -> ApiResult<Json<Vec<AccessLogEntry>>> {
    Ok(Json(state.links.access_log(&caller, &id).await?))
}
