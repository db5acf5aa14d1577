//! Core type definitions used across the HealthLink workspace.

pub mod id;
pub mod token;

pub use id::*;
pub use token::{TOKEN_BYTES, random_key_bytes, random_token};
