//! Recipient-facing manifest operations.

use std::sync::Arc;

use tracing::{debug, info};

use healthlink_auth::{AccessTicketBroker, PasscodeGuard};
use healthlink_core::error::AppError;
use healthlink_core::result::AppResult;
use healthlink_core::types::{ContentHash, EndpointId, LinkId};
use healthlink_database::repositories::{AccessLogRepository, EndpointRepository, FileRepository};
use healthlink_entity::manifest::{Manifest, ManifestRequest};

use super::builder::ManifestBuilder;
use crate::endpoint::payload::encrypt_endpoint;
use crate::endpoint::token_manager::EndpointTokenManager;

/// Gates manifest requests, mints tickets, and resolves ticketed locations.
#[derive(Debug, Clone)]
pub struct ManifestService {
    guard: PasscodeGuard,
    tickets: AccessTicketBroker,
    files: FileRepository,
    endpoints: EndpointRepository,
    tokens: Arc<EndpointTokenManager>,
    access_log: AccessLogRepository,
    builder: ManifestBuilder,
    embedded_length_max: u64,
}

impl ManifestService {
    /// Creates a new manifest service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        guard: PasscodeGuard,
        tickets: AccessTicketBroker,
        files: FileRepository,
        endpoints: EndpointRepository,
        tokens: Arc<EndpointTokenManager>,
        access_log: AccessLogRepository,
        builder: ManifestBuilder,
        embedded_length_max: u64,
    ) -> Self {
        Self {
            guard,
            tickets,
            files,
            endpoints,
            tokens,
            access_log,
            builder,
            embedded_length_max,
        }
    }

    /// Evaluate the gate and, when it admits the request, record the
    /// access and return a manifest whose locations carry a fresh ticket.
    pub async fn request_manifest(
        &self,
        link_id: &LinkId,
        request: ManifestRequest,
    ) -> AppResult<Manifest> {
        let recipient = request
            .recipient
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AppError::bad_request("Missing recipient in request body"))?;

        let link = self.guard.admit(link_id, request.passcode.as_deref()).await?;

        let embed_limit = request
            .embedded_length_max
            .map_or(self.embedded_length_max, |wanted| wanted.min(self.embedded_length_max));

        let ticket = self.tickets.issue(&link.id).await;
        self.access_log.record(&link.id, recipient).await?;

        let files = self.files.list_for_manifest(&link.id, embed_limit).await?;
        let endpoints = self.endpoints.list_ids(&link.id).await?;
        info!(
            link_id = %link.id,
            files = files.len(),
            endpoints = endpoints.len(),
            "Manifest issued"
        );
        Ok(self.builder.build(&link.id, &ticket, files, &endpoints))
    }

    /// Bytes of a file listed in a manifest.
    pub async fn file(
        &self,
        link_id: &LinkId,
        hash: &ContentHash,
        ticket: Option<&str>,
    ) -> AppResult<Vec<u8>> {
        self.tickets.require(ticket, link_id).await?;
        let content = self
            .files
            .fetch(link_id, hash)
            .await?
            .ok_or_else(|| AppError::not_found("File not found."))?;
        debug!(link_id = %link_id, bytes = content.len(), "File served");
        Ok(content)
    }

    /// Encrypted access payload of an endpoint listed in a manifest. A
    /// stale token is refreshed first.
    pub async fn endpoint(
        &self,
        link_id: &LinkId,
        id: &EndpointId,
        ticket: Option<&str>,
    ) -> AppResult<String> {
        self.tickets.require(ticket, link_id).await?;
        let endpoint = self
            .tokens
            .fresh(link_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Endpoint not found."))?;
        debug!(link_id = %link_id, endpoint_id = %id, "Endpoint served");
        encrypt_endpoint(&endpoint)
    }
}
