//! Access log repository.
//!
//! Recording an access is the single point where manifest issuance
//! becomes visible to live subscribers.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use healthlink_core::error::{AppError, ErrorKind};
use healthlink_core::events::AccessEvent;
use healthlink_core::result::AppResult;
use healthlink_core::traits::AccessEventPublisher;
use healthlink_core::types::LinkId;
use healthlink_entity::access::AccessLogEntry;

/// Repository for the append-only access audit trail.
#[derive(Debug, Clone)]
pub struct AccessLogRepository {
    pool: SqlitePool,
    publisher: Arc<dyn AccessEventPublisher>,
}

impl AccessLogRepository {
    /// Create a new access log repository that publishes through `publisher`.
    pub fn new(pool: SqlitePool, publisher: Arc<dyn AccessEventPublisher>) -> Self {
        Self { pool, publisher }
    }

    /// Append an entry and notify subscribers of the link.
    pub async fn record(&self, link_id: &LinkId, recipient: &str) -> AppResult<AccessEvent> {
        let event = AccessEvent::new(link_id.clone(), recipient);
        sqlx::query("INSERT INTO access_log (link_id, recipient, accessed_at) VALUES (?, ?, ?)")
            .bind(&event.link_id)
            .bind(&event.recipient)
            .bind(event.accessed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record access", e))?;

        debug!(link_id = %link_id, "Access recorded");
        self.publisher.publish(&event);
        Ok(event)
    }

    /// Entries for a link, newest first.
    pub async fn list(&self, link_id: &LinkId) -> AppResult<Vec<AccessLogEntry>> {
        sqlx::query_as::<_, AccessLogEntry>(
            "SELECT link_id, recipient, accessed_at FROM access_log \
             WHERE link_id = ? ORDER BY id DESC",
        )
        .bind(link_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list access log", e))
    }
}
