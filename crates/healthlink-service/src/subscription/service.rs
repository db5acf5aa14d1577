//! Subscription issuance and live session opening.

use tracing::info;

use healthlink_auth::{SubscriptionBroker, SubscriptionRequest};
use healthlink_core::result::AppResult;
use healthlink_database::repositories::LinkRepository;
use healthlink_entity::link::LinkStatus;
use healthlink_realtime::{LiveSession, RealtimeEngine};

/// Issues subscription tickets and turns them into live sessions.
#[derive(Debug, Clone)]
pub struct SubscriptionService {
    broker: SubscriptionBroker,
    links: LinkRepository,
    realtime: RealtimeEngine,
    base_url: String,
}

impl SubscriptionService {
    /// Creates a new subscription service.
    pub fn new(
        broker: SubscriptionBroker,
        links: LinkRepository,
        realtime: RealtimeEngine,
        public_url: &str,
    ) -> Self {
        Self {
            broker,
            links,
            realtime,
            base_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Mints a ticket for the managed links in `requests` and returns the
    /// URL of the live stream it opens.
    pub async fn subscribe(&self, requests: &[SubscriptionRequest]) -> AppResult<String> {
        let ticket = self.broker.issue(requests).await?;
        Ok(format!("{}/api/subscribe/{ticket}", self.base_url))
    }

    /// Opens a live session for a subscription ticket. The session starts
    /// with the current status of every link the ticket grants.
    pub async fn open(&self, ticket: &str) -> AppResult<LiveSession> {
        let link_ids = self.broker.redeem(ticket).await?;
        let mut statuses = Vec::with_capacity(link_ids.len());
        for id in &link_ids {
            if let Some(link) = self.links.find_by_id(id).await? {
                statuses.push(LinkStatus::from(&link));
            }
        }
        info!(links = statuses.len(), "Live subscription opened");
        Ok(self.realtime.open_session(statuses))
    }
}
