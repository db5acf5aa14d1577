//! In-memory registry backend.

pub mod registry;

pub use registry::MemoryTicketRegistry;
