//! Sink table: link id → registered delivery targets.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use healthlink_core::events::AccessEvent;
use healthlink_core::traits::AccessEventPublisher;
use healthlink_core::types::LinkId;

use crate::message::types::LiveEvent;

/// Identifier of one delivery target. A session uses the same id for every
/// link it watches.
pub type SinkId = u64;

/// In-process publish/subscribe of access events, keyed by link id.
#[derive(Debug)]
pub struct AccessEventBus {
    /// Link id → sink id → sender.
    sinks: DashMap<LinkId, HashMap<SinkId, mpsc::Sender<LiveEvent>>>,
    next_sink: AtomicU64,
    buffer_size: usize,
}

impl AccessEventBus {
    /// Creates an empty bus whose session channels hold `buffer_size` events.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            sinks: DashMap::new(),
            next_sink: AtomicU64::new(1),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Allocates a fresh sink id together with its channel.
    pub fn open_sink(&self) -> (SinkId, mpsc::Sender<LiveEvent>, mpsc::Receiver<LiveEvent>) {
        let id = self.next_sink.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.buffer_size);
        (id, tx, rx)
    }

    /// Registers `sender` under `sink` for events of `link_id`.
    pub fn subscribe(&self, link_id: LinkId, sink: SinkId, sender: mpsc::Sender<LiveEvent>) {
        debug!(link_id = %link_id, sink, "Sink subscribed");
        self.sinks.entry(link_id).or_default().insert(sink, sender);
    }

    /// Removes `sink` from `link_id`. Empty entries are dropped.
    pub fn unsubscribe(&self, link_id: &LinkId, sink: SinkId) {
        if let Some(mut entry) = self.sinks.get_mut(link_id) {
            entry.remove(&sink);
            if entry.is_empty() {
                drop(entry);
                self.sinks.remove_if(link_id, |_, sinks| sinks.is_empty());
            }
        }
        debug!(link_id = %link_id, sink, "Sink unsubscribed");
    }

    /// Sends `event` to every sink of `link_id`, pruning closed ones.
    /// Returns the number of sinks that accepted the event.
    pub fn deliver(&self, link_id: &LinkId, event: LiveEvent) -> usize {
        let Some(mut entry) = self.sinks.get_mut(link_id) else {
            return 0;
        };

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (sink, sender) in entry.iter() {
            match sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(link_id = %link_id, sink, "Sink buffer full, event dropped");
                }
                Err(TrySendError::Closed(_)) => closed.push(*sink),
            }
        }
        for sink in closed {
            entry.remove(&sink);
        }
        if entry.is_empty() {
            drop(entry);
            self.sinks.remove_if(link_id, |_, sinks| sinks.is_empty());
        }
        delivered
    }

    /// Number of sinks registered for `link_id`.
    pub fn subscriber_count(&self, link_id: &LinkId) -> usize {
        self.sinks.get(link_id).map(|s| s.len()).unwrap_or(0)
    }

    /// Number of links with at least one sink.
    pub fn watched_links(&self) -> usize {
        self.sinks.len()
    }
}

impl AccessEventPublisher for AccessEventBus {
    fn publish(&self, event: &AccessEvent) {
        let delivered = self.deliver(&event.link_id, LiveEvent::connection(event));
        debug!(link_id = %event.link_id, delivered, "Access event published");
    }
}
