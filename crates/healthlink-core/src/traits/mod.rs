//! Core traits defined in `healthlink-core` and implemented by other crates.

pub mod events;
pub mod ticket;

pub use events::{AccessEventPublisher, NoopPublisher};
pub use ticket::TicketRegistry;
