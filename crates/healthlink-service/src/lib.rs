//! # healthlink-service
//!
//! Business logic service layer for HealthLink. Each service orchestrates
//! repositories, the gate and ticket brokers, and the realtime engine to
//! implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time.

pub mod context;
pub mod endpoint;
pub mod link;
pub mod manifest;
pub mod subscription;

pub use context::RequestContext;
pub use endpoint::{EndpointTokenManager, HttpTokenClient, TokenClient};
pub use link::LinkService;
pub use manifest::{ManifestBuilder, ManifestService};
pub use subscription::SubscriptionService;
