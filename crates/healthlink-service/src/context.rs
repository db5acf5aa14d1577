//! Request context carrying the resolved owner.

use healthlink_core::types::UserId;

/// Context for an owner-facing request.
///
/// Built by the API layer after caller resolution and passed into service
/// methods so every operation knows who is acting.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The resolved user.
    pub user_id: UserId,
}

impl RequestContext {
    /// Creates a new request context for `user_id`.
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}
