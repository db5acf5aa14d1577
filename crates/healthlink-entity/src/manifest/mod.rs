//! Manifest request and response types.

use serde::{Deserialize, Serialize};

/// Content type of endpoint entries in a manifest.
pub const CONTENT_TYPE_API_ACCESS: &str = "application/smart-api-access";

/// Content type of file and endpoint resolution responses.
pub const CONTENT_TYPE_JOSE: &str = "application/jose";

/// Body of a manifest request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRequest {
    /// Self-declared recipient. Required.
    #[serde(default)]
    pub recipient: Option<String>,
    /// Passcode, when the link requires one.
    #[serde(default)]
    pub passcode: Option<String>,
    /// Caller's preferred inline limit in bytes.
    #[serde(default)]
    pub embedded_length_max: Option<u64>,
}

/// One fetchable location in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Media type of the referenced content.
    pub content_type: String,
    /// Inline content, when small enough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded: Option<String>,
    /// Ticketed URL.
    pub location: String,
}

/// Manifest response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Files followed by endpoints.
    pub files: Vec<ManifestEntry>,
}
