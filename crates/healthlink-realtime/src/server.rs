//! Top-level real-time engine.

use std::sync::Arc;

use tracing::info;

use healthlink_core::config::RealtimeConfig;
use healthlink_core::traits::AccessEventPublisher;
use healthlink_entity::link::LinkStatus;

use crate::bus::registry::AccessEventBus;
use crate::message::types::LiveEvent;
use crate::session::live::LiveSession;

/// Owns the access event bus and opens live sessions against it.
#[derive(Debug, Clone)]
pub struct RealtimeEngine {
    bus: Arc<AccessEventBus>,
    config: RealtimeConfig,
}

impl RealtimeEngine {
    /// Creates a new engine.
    pub fn new(config: RealtimeConfig) -> Self {
        info!(
            buffer = config.channel_buffer_size,
            keepalive_seconds = config.keepalive_interval_seconds,
            "Realtime engine initialized"
        );
        Self {
            bus: Arc::new(AccessEventBus::new(config.channel_buffer_size)),
            config,
        }
    }

    /// The shared bus.
    pub fn bus(&self) -> &Arc<AccessEventBus> {
        &self.bus
    }

    /// The bus as a publisher for the access-recording path.
    pub fn publisher(&self) -> Arc<dyn AccessEventPublisher> {
        self.bus.clone()
    }

    /// Opens a session watching the given links, starting from their
    /// current status.
    pub fn open_session(&self, statuses: Vec<LinkStatus>) -> LiveSession {
        let initial = statuses.into_iter().map(LiveEvent::Status).collect();
        LiveSession::open(self.bus.clone(), initial, self.config.keepalive_interval())
    }
}
