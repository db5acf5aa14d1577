//! Link owners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use healthlink_core::types::UserId;

/// A user known to own at least one link.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// External user identifier.
    pub id: UserId,
    /// First time the user created a link.
    pub created_at: DateTime<Utc>,
}
