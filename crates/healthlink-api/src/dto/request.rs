//! Request DTOs.

use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;

use healthlink_core::error::AppError;
use healthlink_entity::file::NewFile;

/// Header carrying an optional label for an uploaded file.
pub const FILE_LABEL_HEADER: &str = "x-file-label";

/// Build a [`NewFile`] from an upload's headers and raw body.
///
/// The content type is mandatory; the label is taken from
/// [`FILE_LABEL_HEADER`] when present.
pub fn new_file(headers: &HeaderMap, body: Vec<u8>) -> Result<NewFile, AppError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing content-type header"))?;

    let label = headers
        .get(FILE_LABEL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from);

    Ok(NewFile {
        content_type: content_type.to_string(),
        content: body,
        label,
    })
}
