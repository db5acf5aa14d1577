//! Short-lived bearer tickets.

pub mod access;
pub mod subscription;

pub use access::AccessTicketBroker;
pub use subscription::{SUBSCRIPTION_TICKET_PREFIX, SubscriptionBroker, SubscriptionRequest};
