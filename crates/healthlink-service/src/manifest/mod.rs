//! Manifest issuance and ticketed resolution of its locations.

pub mod builder;
pub mod service;

pub use builder::ManifestBuilder;
pub use service::ManifestService;
