//! Link management service.
//!
//! Every mutation requires the link to exist and be active (`NotFound`
//! otherwise) and to be owned by the caller (`Unauthorized` otherwise).
//! Reactivation is the exception: it only checks ownership.

use std::sync::Arc;

use tracing::info;

use healthlink_core::error::AppError;
use healthlink_core::result::AppResult;
use healthlink_core::types::{ContentHash, LinkId};
use healthlink_database::repositories::{
    AccessLogRepository, FileRepository, LinkRepository, UserRepository,
};
use healthlink_entity::access::AccessLogEntry;
use healthlink_entity::endpoint::NewEndpoint;
use healthlink_entity::file::NewFile;
use healthlink_entity::link::{Link, LinkConfig, LinkFull};

use crate::context::RequestContext;
use crate::endpoint::token_manager::EndpointTokenManager;

const LINK_GONE: &str = "SHL does not exist or has been deactivated.";

/// Creates, lists, and mutates the caller's links.
#[derive(Debug, Clone)]
pub struct LinkService {
    links: LinkRepository,
    files: FileRepository,
    users: UserRepository,
    access_log: AccessLogRepository,
    tokens: Arc<EndpointTokenManager>,
    file_size_max: u64,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        links: LinkRepository,
        files: FileRepository,
        users: UserRepository,
        access_log: AccessLogRepository,
        tokens: Arc<EndpointTokenManager>,
        file_size_max: u64,
    ) -> Self {
        Self {
            links,
            files,
            users,
            access_log,
            tokens,
            file_size_max,
        }
    }

    /// Maximum accepted file size in bytes.
    pub fn file_size_max(&self) -> u64 {
        self.file_size_max
    }

    /// Creates a link owned by the caller.
    pub async fn create(&self, ctx: &RequestContext, config: LinkConfig) -> AppResult<LinkFull> {
        let link = self.links.create(config, &ctx.user_id).await?;
        info!(user_id = %ctx.user_id, link_id = %link.public.id, "Link created");
        Ok(link)
    }

    /// Active links of the caller. Unknown users simply have none.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<LinkFull>> {
        if self.users.find_by_id(&ctx.user_id).await?.is_none() {
            return Ok(Vec::new());
        }
        self.links.list_for_user(&ctx.user_id).await
    }

    /// Overlays the supplied config fields on the link.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &LinkId,
        update: LinkConfig,
    ) -> AppResult<LinkFull> {
        let link = self.owned_active(ctx, id).await?;
        let mut config = link.config;
        config.merge(update);
        if !self.links.update_config(id, &config).await? {
            return Err(AppError::internal("Failed to update SHL"));
        }
        info!(user_id = %ctx.user_id, link_id = %id, "Link updated");
        self.full(ctx, id).await
    }

    /// Deactivates the link and returns the caller's remaining active links.
    pub async fn deactivate(&self, ctx: &RequestContext, id: &LinkId) -> AppResult<Vec<LinkFull>> {
        self.owned_active(ctx, id).await?;
        if !self.links.deactivate(id).await? {
            return Err(AppError::internal("Failed to deactivate SHL"));
        }
        info!(user_id = %ctx.user_id, link_id = %id, "Link deactivated");
        self.links.list_for_user(&ctx.user_id).await
    }

    /// Reactivates the link and restores its passcode attempts.
    pub async fn reactivate(&self, ctx: &RequestContext, id: &LinkId) -> AppResult<bool> {
        if self.links.find_owned(id, &ctx.user_id).await?.is_none() {
            return Err(AppError::unauthorized("Unauthorized"));
        }
        let reactivated = self.links.reactivate(id).await?;
        info!(user_id = %ctx.user_id, link_id = %id, reactivated, "Link reactivated");
        Ok(reactivated)
    }

    /// Attaches pre-encrypted content to the link.
    pub async fn add_file(
        &self,
        ctx: &RequestContext,
        id: &LinkId,
        file: NewFile,
    ) -> AppResult<LinkFull> {
        self.owned_active(ctx, id).await?;
        if file.content.len() as u64 > self.file_size_max {
            return Err(AppError::size_limit_exceeded(self.file_size_max));
        }
        let hash = self.files.add(id, &file).await?;
        info!(
            user_id = %ctx.user_id,
            link_id = %id,
            content_hash = %hash,
            bytes = file.content.len(),
            "File added"
        );
        self.full(ctx, id).await
    }

    /// Detaches one file. The stored content is kept.
    pub async fn remove_file(
        &self,
        ctx: &RequestContext,
        id: &LinkId,
        hash: &ContentHash,
    ) -> AppResult<LinkFull> {
        self.owned_active(ctx, id).await?;
        let removed = self.files.remove(id, hash).await?;
        info!(user_id = %ctx.user_id, link_id = %id, content_hash = %hash, removed, "File removed");
        self.full(ctx, id).await
    }

    /// Detaches every file.
    pub async fn remove_all_files(&self, ctx: &RequestContext, id: &LinkId) -> AppResult<LinkFull> {
        self.owned_active(ctx, id).await?;
        let removed = self.files.remove_all(id).await?;
        info!(user_id = %ctx.user_id, link_id = %id, removed, "All files removed");
        self.full(ctx, id).await
    }

    /// Attaches an OAuth-backed endpoint after obtaining its first token.
    pub async fn add_endpoint(
        &self,
        ctx: &RequestContext,
        id: &LinkId,
        endpoint: NewEndpoint,
    ) -> AppResult<LinkFull> {
        self.owned_active(ctx, id).await?;
        self.tokens.register(id, endpoint).await?;
        self.full(ctx, id).await
    }

    /// Access history of the link, newest first.
    pub async fn access_log(
        &self,
        ctx: &RequestContext,
        id: &LinkId,
    ) -> AppResult<Vec<AccessLogEntry>> {
        self.owned_active(ctx, id).await?;
        self.access_log.list(id).await
    }

    /// Whether the link is active. Unknown ids are `NotFound`.
    pub async fn is_active(&self, id: &LinkId) -> AppResult<bool> {
        self.links
            .find_by_id(id)
            .await?
            .map(|link| link.active)
            .ok_or_else(|| AppError::not_found(LINK_GONE))
    }

    async fn owned_active(&self, ctx: &RequestContext, id: &LinkId) -> AppResult<Link> {
        if !self.links.exists_active(id).await? {
            return Err(AppError::not_found(LINK_GONE));
        }
        self.links
            .find_owned(id, &ctx.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))
    }

    async fn full(&self, ctx: &RequestContext, id: &LinkId) -> AppResult<LinkFull> {
        self.links
            .find_full_for_user(id, &ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(LINK_GONE))
    }
}
