//! # healthlink-entity
//!
//! Domain entity models for HealthLink. Every struct in this crate
//! represents a database table row, a wire projection, or a domain value
//! object. Row types additionally derive `sqlx::FromRow`.

pub mod access;
pub mod endpoint;
pub mod file;
pub mod link;
pub mod manifest;
pub mod user;
