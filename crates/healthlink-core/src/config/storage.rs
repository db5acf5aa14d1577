//! Content size limits.

use serde::{Deserialize, Serialize};

/// Limits applied to stored and embedded content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Maximum size in bytes of a single uploaded file.
    #[serde(default = "default_file_size_max")]
    pub file_size_max_bytes: u64,
    /// Server-side ceiling for inline embedding in manifests.
    #[serde(default = "default_embedded_length_max")]
    pub embedded_length_max: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file_size_max_bytes: default_file_size_max(),
            embedded_length_max: default_embedded_length_max(),
        }
    }
}

fn default_file_size_max() -> u64 {
    100 * 1024 * 1024
}

fn default_embedded_length_max() -> u64 {
    10_000
}
