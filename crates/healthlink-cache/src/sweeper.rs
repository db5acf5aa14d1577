//! Periodic removal of expired tickets.
//!
//! Lookups already ignore expired entries; sweeping only bounds memory.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

use healthlink_core::traits::TicketRegistry;

/// Anything that can drop its expired entries.
#[async_trait]
pub trait RegistrySweeper: Send + Sync {
    /// Remove expired entries and return how many were dropped.
    async fn sweep(&self) -> usize;
}

#[async_trait]
impl<S> RegistrySweeper for Arc<dyn TicketRegistry<S>>
where
    S: Clone + Send + Sync + 'static,
{
    async fn sweep(&self) -> usize {
        self.purge_expired().await
    }
}

/// Spawn a task sweeping every registry once per `interval`.
///
/// The task runs until aborted through the returned handle.
pub fn spawn_sweeper(
    registries: Vec<Arc<dyn RegistrySweeper>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let mut removed = 0;
            for registry in &registries {
                removed += registry.sweep().await;
            }
            if removed > 0 {
                debug!(removed, "Ticket sweep completed");
            }
        }
    })
}
