//! Owner operations on links.

pub mod service;

pub use service::LinkService;
