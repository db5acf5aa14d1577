//! Composes manifest responses.

use healthlink_core::types::{ContentHash, EndpointId, LinkId};
use healthlink_entity::file::ManifestFile;
use healthlink_entity::manifest::{CONTENT_TYPE_API_ACCESS, Manifest, ManifestEntry};

/// Builds ticketed locations under the public base URL.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    base_url: String,
}

impl ManifestBuilder {
    /// Creates a builder for `public_url`. A trailing slash is ignored.
    pub fn new(public_url: &str) -> Self {
        Self {
            base_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Location of a file of a link.
    pub fn file_location(&self, link_id: &LinkId, hash: &ContentHash, ticket: &str) -> String {
        format!("{}/api/shl/{link_id}/file/{hash}?ticket={ticket}", self.base_url)
    }

    /// Location of an endpoint of a link.
    pub fn endpoint_location(&self, link_id: &LinkId, id: &EndpointId, ticket: &str) -> String {
        format!("{}/api/shl/{link_id}/endpoint/{id}?ticket={ticket}", self.base_url)
    }

    /// Files first, then endpoints, all carrying `ticket`.
    pub fn build(
        &self,
        link_id: &LinkId,
        ticket: &str,
        files: Vec<ManifestFile>,
        endpoints: &[EndpointId],
    ) -> Manifest {
        let mut entries = Vec::with_capacity(files.len() + endpoints.len());
        for file in files {
            let embedded = file
                .content
                .filter(|c| !c.is_empty())
                .map(|c| String::from_utf8_lossy(&c).into_owned());
            entries.push(ManifestEntry {
                location: self.file_location(link_id, &file.content_hash, ticket),
                content_type: file.content_type,
                embedded,
            });
        }
        for id in endpoints {
            entries.push(ManifestEntry {
                content_type: CONTENT_TYPE_API_ACCESS.to_string(),
                embedded: None,
                location: self.endpoint_location(link_id, id, ticket),
            });
        }
        Manifest { files: entries }
    }
}
