//! OAuth access-token lifecycle of proxied endpoints.
//!
//! An endpoint is Fresh while `now < refresh_time` and is served as stored.
//! Once Stale, the next read refreshes it before serving. Refreshes of one
//! endpoint are serialized: concurrent readers wait on a per-endpoint lock
//! and re-read the row, so a rotated refresh token is consumed once.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use healthlink_core::config::EndpointConfig;
use healthlink_core::result::AppResult;
use healthlink_core::types::{EndpointId, LinkId};
use healthlink_database::repositories::EndpointRepository;
use healthlink_entity::endpoint::{Endpoint, NewEndpoint};

use super::client::TokenClient;

/// Keeps endpoint tokens fresh and persists every refresh.
#[derive(Debug)]
pub struct EndpointTokenManager {
    endpoints: EndpointRepository,
    client: Arc<dyn TokenClient>,
    token_lifetime: Duration,
    refresh_locks: DashMap<EndpointId, Arc<Mutex<()>>>,
}

impl EndpointTokenManager {
    /// Creates a manager issuing token requests through `client`.
    pub fn new(
        endpoints: EndpointRepository,
        client: Arc<dyn TokenClient>,
        config: &EndpointConfig,
    ) -> Self {
        let seconds = config.token_lifetime_seconds.min(u64::from(u32::MAX));
        Self {
            endpoints,
            client,
            token_lifetime: Duration::seconds(seconds as i64),
            refresh_locks: DashMap::new(),
        }
    }

    /// Request a new token for `endpoint` and apply it. Does not persist.
    pub async fn refresh(&self, mut endpoint: Endpoint) -> AppResult<Endpoint> {
        let response = self.client.refresh(&endpoint.config).await?;
        endpoint.apply_refresh(response, Utc::now() + self.token_lifetime);
        info!(endpoint_id = %endpoint.id, link_id = %endpoint.link_id, "Endpoint token refreshed");
        Ok(endpoint)
    }

    /// Attach a new endpoint to a link. The first token is obtained before
    /// the endpoint is stored, so a bad refresh token is rejected up front.
    pub async fn register(&self, link_id: &LinkId, new: NewEndpoint) -> AppResult<EndpointId> {
        let endpoint = Endpoint::from_new(EndpointId::generate(), link_id.clone(), new);
        let endpoint = self.refresh(endpoint).await?;
        self.endpoints.create(&endpoint).await?;
        info!(endpoint_id = %endpoint.id, link_id = %link_id, "Endpoint added");
        Ok(endpoint.id)
    }

    /// The endpoint with a token that is fresh at the time of the call, or
    /// `None` when the link has no such endpoint.
    pub async fn fresh(&self, link_id: &LinkId, id: &EndpointId) -> AppResult<Option<Endpoint>> {
        let Some(endpoint) = self.endpoints.find(link_id, id).await? else {
            return Ok(None);
        };
        if !endpoint.is_stale_at(Utc::now()) {
            return Ok(Some(endpoint));
        }

        let refreshed = {
            let lock = self
                .refresh_locks
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            let _guard = lock.lock().await;
            self.refresh_if_stale(link_id, id).await
        };
        // Drop the lock entry once no other request is waiting on it.
        self.refresh_locks
            .remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
        refreshed
    }

    /// Re-read under the endpoint's lock; another request may have
    /// refreshed while this one waited.
    async fn refresh_if_stale(
        &self,
        link_id: &LinkId,
        id: &EndpointId,
    ) -> AppResult<Option<Endpoint>> {
        let Some(endpoint) = self.endpoints.find(link_id, id).await? else {
            return Ok(None);
        };
        if !endpoint.is_stale_at(Utc::now()) {
            debug!(endpoint_id = %id, "Token refreshed by concurrent request");
            return Ok(Some(endpoint));
        }

        let endpoint = self.refresh(endpoint).await?;
        self.endpoints.update_token(&endpoint).await?;
        Ok(Some(endpoint))
    }
}
