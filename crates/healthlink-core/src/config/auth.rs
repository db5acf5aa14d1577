//! Caller resolution configuration.

use serde::{Deserialize, Serialize};

/// How the owner-facing API identifies its caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header set by a trusted reverse proxy carrying the user id.
    /// When unset, only management tokens identify a caller.
    #[serde(default)]
    pub trusted_user_header: Option<String>,
}
