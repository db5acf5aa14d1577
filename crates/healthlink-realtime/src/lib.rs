//! # healthlink-realtime
//!
//! Live access feed for link owners. Provides:
//!
//! - An in-process event bus keyed by link id (`bus`)
//! - Typed `status` / `connection` / `keepalive` events (`message`)
//! - Live sessions that deregister from the bus when dropped (`session`)

pub mod bus;
pub mod message;
pub mod server;
pub mod session;

pub use bus::registry::{AccessEventBus, SinkId};
pub use message::types::LiveEvent;
pub use server::RealtimeEngine;
pub use session::live::LiveSession;
