//! Managed API endpoint configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for OAuth-backed endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Seconds a refreshed access token is considered fresh.
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_seconds: u64,
    /// Timeout for requests to the upstream token endpoint.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl EndpointConfig {
    /// Upstream request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            token_lifetime_seconds: default_token_lifetime(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_token_lifetime() -> u64 {
    300
}

fn default_request_timeout() -> u64 {
    10
}
