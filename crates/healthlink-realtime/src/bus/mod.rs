//! Per-link fan-out of access events.

pub mod registry;
