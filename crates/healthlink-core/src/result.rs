//! Convenience result type alias for HealthLink.

use crate::error::AppError;

/// A specialized `Result` type for HealthLink operations.
pub type AppResult<T> = Result<T, AppError>;
