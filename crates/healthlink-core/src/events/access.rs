//! Link access events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::LinkId;

/// A successful manifest request against a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEvent {
    /// The link that was accessed.
    pub link_id: LinkId,
    /// Self-declared recipient from the manifest request.
    pub recipient: String,
    /// When the access was recorded.
    pub accessed_at: DateTime<Utc>,
}

impl AccessEvent {
    /// Create an event stamped with the current time.
    pub fn new(link_id: LinkId, recipient: impl Into<String>) -> Self {
        Self {
            link_id,
            recipient: recipient.into(),
            accessed_at: Utc::now(),
        }
    }
}
