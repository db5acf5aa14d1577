//! Live subscription configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Live subscription (SSE) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-session outbound event buffer.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Interval between keepalive events.
    #[serde(default = "default_keepalive")]
    pub keepalive_interval_seconds: u64,
}

impl RealtimeConfig {
    /// Keepalive period.
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_seconds.max(1))
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            keepalive_interval_seconds: default_keepalive(),
        }
    }
}

fn default_channel_buffer() -> usize {
    64
}

fn default_keepalive() -> u64 {
    15
}
