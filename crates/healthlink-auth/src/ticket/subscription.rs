//! Tickets that open a live subscription to a set of links.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use healthlink_core::error::AppError;
use healthlink_core::result::AppResult;
use healthlink_core::traits::TicketRegistry;
use healthlink_core::types::{LinkId, random_token};
use healthlink_database::repositories::LinkRepository;

/// Prefix distinguishing subscription tickets from access tickets.
pub const SUBSCRIPTION_TICKET_PREFIX: &str = "subscription-ticket-";

/// One link the caller wants to watch, proven by its management token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// Link to watch.
    pub shl_id: LinkId,
    /// Management token of that link.
    pub management_token: String,
}

/// Issues tickets scoping a live session to the links the caller manages.
#[derive(Debug, Clone)]
pub struct SubscriptionBroker {
    registry: Arc<dyn TicketRegistry<Vec<LinkId>>>,
    links: LinkRepository,
    ttl: Duration,
}

impl SubscriptionBroker {
    /// Creates a broker storing tickets in `registry`, each valid for `ttl`.
    pub fn new(
        registry: Arc<dyn TicketRegistry<Vec<LinkId>>>,
        links: LinkRepository,
        ttl: Duration,
    ) -> Self {
        Self {
            registry,
            links,
            ttl,
        }
    }

    /// Mint a ticket for every requested link whose management token
    /// matches. Unauthorized entries are dropped; if none remain the
    /// request fails as unauthorized.
    pub async fn issue(&self, requests: &[SubscriptionRequest]) -> AppResult<String> {
        let mut authorized: Vec<LinkId> = Vec::with_capacity(requests.len());
        for request in requests {
            match self
                .links
                .find_managed(&request.shl_id, &request.management_token)
                .await?
            {
                Some(link) if !authorized.contains(&link.id) => authorized.push(link.id),
                Some(_) => {}
                None => debug!(link_id = %request.shl_id, "Dropping unauthorized subscription"),
            }
        }

        if authorized.is_empty() {
            return Err(AppError::unauthorized("Unauthorized"));
        }

        let ticket = format!("{SUBSCRIPTION_TICKET_PREFIX}{}", random_token());
        info!(links = authorized.len(), "Subscription ticket issued");
        self.registry.insert(ticket.clone(), authorized, self.ttl).await;
        Ok(ticket)
    }

    /// Links a live ticket grants.
    pub async fn redeem(&self, ticket: &str) -> AppResult<Vec<LinkId>> {
        self.registry
            .get(ticket)
            .await
            .ok_or_else(|| AppError::unauthorized("Invalid ticket for SSE subscription"))
    }

    /// The backing registry, for sweeping.
    pub fn registry(&self) -> Arc<dyn TicketRegistry<Vec<LinkId>>> {
        Arc::clone(&self.registry)
    }
}
