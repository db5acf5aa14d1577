//! # healthlink-api
//!
//! HTTP API layer for HealthLink built on Axum.
//!
//! Provides the recipient endpoints (manifest, ticketed file and endpoint
//! resolution), the owner's link management endpoints, the live
//! subscription stream, middleware (CORS, logging), extractors, and error
//! mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
