//! # healthlink-database
//!
//! SQLite connection management, the content-addressed blob store, and
//! concrete repository implementations for all HealthLink entities.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
