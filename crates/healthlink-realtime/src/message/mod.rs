//! Events delivered over a live session.

pub mod types;
