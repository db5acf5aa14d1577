//! Ticket registry trait for short-lived bearer capabilities.

use std::time::Duration;

use async_trait::async_trait;

/// Maps opaque ticket strings to the value they authorize.
///
/// Expiry is measured on a monotonic clock and checked on every lookup;
/// a ticket past its deadline is indistinguishable from an unknown one.
/// Sweeping is only a memory bound and never affects correctness.
#[async_trait]
pub trait TicketRegistry<S>: Send + Sync + std::fmt::Debug + 'static
where
    S: Clone + Send + Sync + 'static,
{
    /// Store a value under `ticket`, valid for `ttl` from now.
    async fn insert(&self, ticket: String, value: S, ttl: Duration);

    /// Return the value if the ticket exists and has not expired.
    async fn get(&self, ticket: &str) -> Option<S>;

    /// Remove a ticket immediately.
    async fn remove(&self, ticket: &str);

    /// Drop every expired entry, returning how many were removed.
    async fn purge_expired(&self) -> usize;

    /// Number of entries currently held, expired or not.
    async fn len(&self) -> usize;

    /// Whether the registry holds no entries.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
