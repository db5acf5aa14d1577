//! File entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use healthlink_core::types::{ContentHash, LinkId};

/// Association between a link and a stored blob.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LinkFile {
    /// The owning link.
    pub link_id: LinkId,
    /// Content address of the blob.
    pub content_hash: ContentHash,
    /// Declared media type of the (encrypted) content.
    pub content_type: String,
    /// Optional label.
    pub label: Option<String>,
    /// When the association was made.
    pub added_at: DateTime<Utc>,
}

/// File properties without content, as shown to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    /// Optional label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// When the file was added.
    pub added: DateTime<Utc>,
    /// Declared media type.
    pub content_type: String,
    /// Content address.
    pub content_hash: ContentHash,
}

impl From<LinkFile> for FileSummary {
    fn from(file: LinkFile) -> Self {
        Self {
            label: file.label,
            added: file.added_at,
            content_type: file.content_type,
            content_hash: file.content_hash,
        }
    }
}

/// A file as listed in a manifest. `content` is present only when the
/// blob fits the embed limit.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    /// Declared media type.
    pub content_type: String,
    /// Content address.
    pub content_hash: ContentHash,
    /// Inline content, if small enough.
    pub content: Option<Vec<u8>>,
}

/// Content submitted by an owner.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Declared media type.
    pub content_type: String,
    /// Raw (already encrypted) bytes.
    pub content: Vec<u8>,
    /// Optional label.
    pub label: Option<String>,
}
