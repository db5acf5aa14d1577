//! Ticket registry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Access and subscription ticket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketConfig {
    /// Registry backend. Only `"memory"` is available.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Lifetime of an access ticket in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: u64,
    /// Lifetime of a subscription ticket in seconds.
    #[serde(default = "default_subscription_ttl")]
    pub subscription_ttl_seconds: u64,
    /// How often expired tickets are swept from memory.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl TicketConfig {
    /// Access ticket lifetime.
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_seconds)
    }

    /// Subscription ticket lifetime.
    pub fn subscription_ttl(&self) -> Duration {
        Duration::from_secs(self.subscription_ttl_seconds)
    }

    /// Sweep period.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            access_ttl_seconds: default_access_ttl(),
            subscription_ttl_seconds: default_subscription_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_access_ttl() -> u64 {
    60
}

fn default_subscription_ttl() -> u64 {
    10
}

fn default_sweep_interval() -> u64 {
    30
}
