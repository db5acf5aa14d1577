//! Route handlers organized by audience.

pub mod health;
pub mod link;
pub mod manifest;
pub mod subscription;
