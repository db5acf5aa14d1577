//! A live subscription session as an event stream.
//!
//! The session yields one `status` event per watched link, then
//! `connection` events as they are published, interleaved with periodic
//! `keepalive` heartbeats. Dropping the session (for example when the
//! client disconnects and the response body is dropped) removes its sink
//! from every link on the bus.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::debug;

use healthlink_core::types::LinkId;

use crate::bus::registry::{AccessEventBus, SinkId};
use crate::message::types::LiveEvent;

/// Bus registration released on drop.
#[derive(Debug)]
struct Registration {
    bus: Arc<AccessEventBus>,
    sink: SinkId,
    link_ids: Vec<LinkId>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        for link_id in &self.link_ids {
            self.bus.unsubscribe(link_id, self.sink);
        }
        debug!(sink = self.sink, links = self.link_ids.len(), "Live session closed");
    }
}

/// Stream of [`LiveEvent`]s for one subscriber.
#[derive(Debug)]
pub struct LiveSession {
    pending: VecDeque<LiveEvent>,
    receiver: mpsc::Receiver<LiveEvent>,
    keepalive: Interval,
    registration: Registration,
}

impl LiveSession {
    /// Registers a new sink for every link in `initial` and queues their
    /// status events.
    pub(crate) fn open(
        bus: Arc<AccessEventBus>,
        initial: Vec<LiveEvent>,
        keepalive_period: Duration,
    ) -> Self {
        let (sink, sender, receiver) = bus.open_sink();
        let mut link_ids = Vec::with_capacity(initial.len());
        for event in &initial {
            if let Some(link_id) = event.link_id() {
                if !link_ids.contains(link_id) {
                    bus.subscribe(link_id.clone(), sink, sender.clone());
                    link_ids.push(link_id.clone());
                }
            }
        }

        let mut keepalive = time::interval_at(Instant::now() + keepalive_period, keepalive_period);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(sink, links = link_ids.len(), "Live session opened");
        Self {
            pending: initial.into(),
            receiver,
            keepalive,
            registration: Registration {
                bus,
                sink,
                link_ids,
            },
        }
    }

    /// Links this session watches.
    pub fn link_ids(&self) -> &[LinkId] {
        &self.registration.link_ids
    }

    /// Sink id on the bus.
    pub fn sink_id(&self) -> SinkId {
        self.registration.sink
    }
}

impl Stream for LiveSession {
    type Item = LiveEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(event) = this.pending.pop_front() {
            return Poll::Ready(Some(event));
        }

        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(event)) => return Poll::Ready(Some(event)),
            Poll::Ready(None) => return Poll::Ready(None),
            Poll::Pending => {}
        }

        if this.keepalive.poll_tick(cx).is_ready() {
            let count = this.registration.link_ids.len();
            return Poll::Ready(Some(LiveEvent::keepalive(count)));
        }

        Poll::Pending
    }
}
