//! Custom Axum extractors.

pub mod auth;
pub mod ticket;

pub use auth::Caller;
pub use ticket::TicketQuery;
