//! Link status projection for live subscribers.

use serde::{Deserialize, Serialize};

use healthlink_core::types::LinkId;

use super::model::Link;

/// Current state of a link as pushed to subscribers. Carries no secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStatus {
    /// Link identifier.
    pub id: LinkId,
    /// Whether the link resolves.
    pub active: bool,
    /// Expiration as unix seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Passcode attempts left.
    pub passcode_failures_remaining: i64,
}

impl From<&Link> for LinkStatus {
    fn from(link: &Link) -> Self {
        Self {
            id: link.id.clone(),
            active: link.active,
            exp: link.config.exp,
            label: link.config.label.clone(),
            passcode_failures_remaining: link.passcode_failures_remaining,
        }
    }
}
