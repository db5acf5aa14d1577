//! # healthlink-core
//!
//! Core crate for the HealthLink share server. Contains the configuration
//! schema, typed identifiers, random token generation, access events, the
//! seam traits implemented by other crates, and the unified error system.
//!
//! This crate has **no** internal dependencies on other HealthLink crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
