//! Proxied endpoints: OAuth token lifecycle and encrypted payloads.

pub mod client;
pub mod payload;
pub mod token_manager;

pub use client::{HttpTokenClient, TokenClient};
pub use token_manager::EndpointTokenManager;
