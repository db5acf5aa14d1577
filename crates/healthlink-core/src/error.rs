//! Unified application error types for HealthLink.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Gate and ticket failures are
//! ordinary values of this type, never panics.

use std::fmt;

use serde_json::json;
use thiserror::Error;

/// Failure category. Decides the HTTP status at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Unknown id, inactive link, or expired link. These are deliberately
    /// indistinguishable to callers.
    NotFound,
    /// The link is passcode protected and no passcode was supplied.
    PasscodeRequired,
    /// The supplied passcode did not match.
    IncorrectPasscode,
    /// Bad, missing, or expired ticket, or a management-token mismatch.
    Unauthorized,
    /// A required field is missing or malformed.
    BadRequest,
    /// Uploaded content is beyond the configured maximum.
    SizeLimitExceeded,
    /// An unexpected internal failure.
    Internal,
    /// A persistence failure.
    Database,
    /// A serialization/deserialization failure.
    Serialization,
    /// A configuration failure.
    Configuration,
    /// An outbound call (e.g. the OAuth token endpoint) failed or timed out.
    ExternalService,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::PasscodeRequired => write!(f, "PASSCODE_REQUIRED"),
            Self::IncorrectPasscode => write!(f, "INCORRECT_PASSCODE"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::SizeLimitExceeded => write!(f, "SIZE_LIMIT_EXCEEDED"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::ExternalService => write!(f, "EXTERNAL_SERVICE"),
        }
    }
}

/// The unified application error used throughout HealthLink.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// Category.
    pub kind: ErrorKind,
    /// Message shown to the caller for non-internal kinds.
    pub message: String,
    /// Structured details surfaced to the caller (e.g. remaining attempts).
    pub details: Option<serde_json::Value>,
    /// Cause, kept for logs only.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Error of `kind` without a cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Error of `kind` wrapping `source`.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach structured details to this error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Unknown, inactive, or expired resource.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a passcode-required denial reporting the remaining attempts.
    pub fn passcode_required(remaining_attempts: u32) -> Self {
        Self::new(ErrorKind::PasscodeRequired, "Passcode required")
            .with_details(json!({ "remainingAttempts": remaining_attempts }))
    }

    /// Create an incorrect-passcode denial reporting the remaining attempts.
    pub fn incorrect_passcode(remaining_attempts: u32) -> Self {
        Self::new(ErrorKind::IncorrectPasscode, "Incorrect passcode")
            .with_details(json!({ "remainingAttempts": remaining_attempts }))
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a bad-request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Create a size-limit error reporting the configured limit.
    pub fn size_limit_exceeded(limit: u64) -> Self {
        Self::new(ErrorKind::SizeLimitExceeded, "File size limit exceeded")
            .with_details(json!({ "limit": limit }))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Persistence failure.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an external-service error.
    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    /// Remaining passcode attempts carried by a gate denial, if any.
    pub fn remaining_attempts(&self) -> Option<u32> {
        self.details
            .as_ref()
            .and_then(|d| d.get("remainingAttempts"))
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("Invalid JSON: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Could not load configuration: {err}"),
            err,
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::with_source(ErrorKind::Database, format!("Database error: {err}"), err)
    }
}
