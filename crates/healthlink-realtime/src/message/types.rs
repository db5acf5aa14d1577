//! Live event type definitions.

use serde::{Deserialize, Serialize};

use healthlink_core::events::AccessEvent;
use healthlink_core::result::AppResult;
use healthlink_core::types::LinkId;
use healthlink_entity::link::LinkStatus;

/// Payload of a `connection` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionNotice {
    /// The link that served a manifest.
    #[serde(rename = "shlId")]
    pub link_id: LinkId,
    /// Recipient named in the manifest request.
    pub recipient: String,
}

/// Payload of a `keepalive` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeepaliveNotice {
    /// Number of links the session watches.
    pub shl_count: usize,
}

/// An event pushed to a live subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    /// Current state of one watched link, sent when the session opens.
    Status(LinkStatus),
    /// A manifest was issued for a watched link.
    Connection(ConnectionNotice),
    /// Periodic heartbeat.
    Keepalive(KeepaliveNotice),
}

impl LiveEvent {
    /// Build a `connection` event from a recorded access.
    pub fn connection(event: &AccessEvent) -> Self {
        Self::Connection(ConnectionNotice {
            link_id: event.link_id.clone(),
            recipient: event.recipient.clone(),
        })
    }

    /// Build a `keepalive` event.
    pub fn keepalive(shl_count: usize) -> Self {
        Self::Keepalive(KeepaliveNotice { shl_count })
    }

    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Connection(_) => "connection",
            Self::Keepalive(_) => "keepalive",
        }
    }

    /// JSON payload on the wire.
    pub fn data(&self) -> AppResult<String> {
        let json = match self {
            Self::Status(status) => serde_json::to_string(status)?,
            Self::Connection(notice) => serde_json::to_string(notice)?,
            Self::Keepalive(notice) => serde_json::to_string(notice)?,
        };
        Ok(json)
    }

    /// Link the event refers to, if any.
    pub fn link_id(&self) -> Option<&LinkId> {
        match self {
            Self::Status(status) => Some(&status.id),
            Self::Connection(notice) => Some(&notice.link_id),
            Self::Keepalive(_) => None,
        }
    }
}
