//! # healthlink-auth
//!
//! Gatekeeping for HealthLink links.
//!
//! ## Modules
//!
//! - `passcode` — active/expiry/passcode gate with throttled attempts
//! - `ticket` — short-lived access and subscription tickets
//! - `caller` — resolution of the owner behind an API call

pub mod caller;
pub mod passcode;
pub mod ticket;

pub use caller::{CallerCredentials, CallerResolver};
pub use passcode::{GateDecision, PasscodeGuard};
pub use ticket::{AccessTicketBroker, SubscriptionBroker, SubscriptionRequest};
