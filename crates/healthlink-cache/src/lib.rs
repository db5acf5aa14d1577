//! # healthlink-cache
//!
//! Volatile ticket registries for HealthLink. Tickets live only in
//! process memory; losing them on restart is acceptable because
//! recipients simply request a new manifest.
//!
//! - **memory**: sharded in-process map using [dashmap](https://crates.io/crates/dashmap)
//!
//! The backend is selected at runtime based on configuration, and a
//! background sweeper bounds memory held by expired entries.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
pub mod sweeper;

pub use provider::build_registry;
pub use sweeper::{RegistrySweeper, spawn_sweeper};
