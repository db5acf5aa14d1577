//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Response of `POST /api/subscribe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeResponse {
    /// URL of the live event stream.
    pub subscribe: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Database reachability.
    pub database: String,
    /// Links currently watched by live sessions.
    pub watched_links: usize,
}
