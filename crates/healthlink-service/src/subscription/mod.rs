//! Live access subscriptions for link owners.

pub mod service;

pub use service::SubscriptionService;
