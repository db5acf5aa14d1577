//! In-memory ticket registry using dashmap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use healthlink_core::traits::TicketRegistry;

#[derive(Debug, Clone)]
struct Entry<S> {
    value: S,
    expires_at: Instant,
}

/// Ticket registry held in a sharded concurrent map.
///
/// Deadlines use tokio's monotonic clock, so paused-time tests can
/// advance past them deterministically.
#[derive(Debug)]
pub struct MemoryTicketRegistry<S> {
    entries: Arc<DashMap<String, Entry<S>>>,
}

impl<S> MemoryTicketRegistry<S> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl<S> Default for MemoryTicketRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for MemoryTicketRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

#[async_trait]
impl<S> TicketRegistry<S> for MemoryTicketRegistry<S>
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    async fn insert(&self, ticket: String, value: S, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(ticket, Entry { value, expires_at });
    }

    async fn get(&self, ticket: &str) -> Option<S> {
        let now = Instant::now();
        let entry = self.entries.get(ticket)?;
        if entry.expires_at <= now {
            drop(entry);
            self.entries.remove_if(ticket, |_, e| e.expires_at <= now);
            return None;
        }
        Some(entry.value.clone())
    }

    async fn remove(&self, ticket: &str) {
        self.entries.remove(ticket);
    }

    async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Purged expired tickets");
        }
        removed
    }

    async fn len(&self) -> usize {
        self.entries.len()
    }
}
