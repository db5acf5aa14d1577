//! Manifest-scoped access tickets.

use std::sync::Arc;
use std::time::Duration;

use healthlink_core::error::AppError;
use healthlink_core::result::AppResult;
use healthlink_core::traits::TicketRegistry;
use healthlink_core::types::{LinkId, random_token};

/// Issues and validates the tickets embedded in manifest locations.
///
/// A ticket is bound to exactly one link and may be redeemed any number
/// of times until it expires.
#[derive(Debug, Clone)]
pub struct AccessTicketBroker {
    registry: Arc<dyn TicketRegistry<LinkId>>,
    ttl: Duration,
}

impl AccessTicketBroker {
    /// Creates a broker storing tickets in `registry`, each valid for `ttl`.
    pub fn new(registry: Arc<dyn TicketRegistry<LinkId>>, ttl: Duration) -> Self {
        Self { registry, ttl }
    }

    /// Mint a ticket for `link_id`.
    pub async fn issue(&self, link_id: &LinkId) -> String {
        let ticket = random_token();
        self.registry
            .insert(ticket.clone(), link_id.clone(), self.ttl)
            .await;
        ticket
    }

    /// Whether `ticket` is live and scoped to `link_id`.
    pub async fn validate(&self, ticket: &str, link_id: &LinkId) -> bool {
        self.registry
            .get(ticket)
            .await
            .is_some_and(|scoped| &scoped == link_id)
    }

    /// Like [`validate`](Self::validate), mapping failure and a missing
    /// ticket to `Unauthorized`.
    pub async fn require(&self, ticket: Option<&str>, link_id: &LinkId) -> AppResult<()> {
        match ticket {
            Some(ticket) if self.validate(ticket, link_id).await => Ok(()),
            _ => Err(AppError::unauthorized("Unauthorized")),
        }
    }

    /// The backing registry, for sweeping.
    pub fn registry(&self) -> Arc<dyn TicketRegistry<LinkId>> {
        Arc::clone(&self.registry)
    }
}
