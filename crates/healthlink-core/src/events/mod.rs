//! Domain events emitted by HealthLink operations.
//!
//! Events are published through an [`AccessEventPublisher`](crate::traits::AccessEventPublisher)
//! and consumed by the live subscription bus.

pub mod access;

pub use access::AccessEvent;
