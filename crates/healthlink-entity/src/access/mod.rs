//! Access audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use healthlink_core::types::LinkId;

/// One successful manifest issuance. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogEntry {
    /// Accessed link.
    pub link_id: LinkId,
    /// Self-declared recipient.
    pub recipient: String,
    /// When the manifest was issued.
    pub accessed_at: DateTime<Utc>,
}
