//! Access event fan-out seam.

use crate::events::AccessEvent;

/// Receives access events after they are durably recorded.
///
/// Implementations must not block: publishing happens on the request path
/// of the manifest operation.
pub trait AccessEventPublisher: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver the event to every current subscriber of its link.
    fn publish(&self, event: &AccessEvent);
}

/// Publisher that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl AccessEventPublisher for NoopPublisher {
    fn publish(&self, _event: &AccessEvent) {}
}
