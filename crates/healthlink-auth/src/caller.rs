//! Resolution of the user behind an owner-facing API call.
//!
//! Bearer JWT verification lives outside this service. Within it, a
//! caller is identified either by a management token presented as a
//! bearer credential, or by a header asserted by a trusted proxy.

use tracing::debug;

use healthlink_core::config::auth::AuthConfig;
use healthlink_core::error::AppError;
use healthlink_core::result::AppResult;
use healthlink_core::types::UserId;
use healthlink_database::repositories::LinkRepository;

/// Credentials extracted from a request.
#[derive(Debug, Clone, Default)]
pub struct CallerCredentials {
    /// Token from `Authorization: Bearer ...`.
    pub bearer: Option<String>,
    /// Value of the trusted user header, when configured and present.
    pub asserted_user: Option<String>,
}

/// Maps request credentials to a user id.
#[derive(Debug, Clone)]
pub struct CallerResolver {
    links: LinkRepository,
    trusted_user_header: Option<String>,
}

impl CallerResolver {
    /// Creates a resolver honoring the trusted header from `config`.
    pub fn new(links: LinkRepository, config: &AuthConfig) -> Self {
        Self {
            links,
            trusted_user_header: config
                .trusted_user_header
                .as_ref()
                .map(|h| h.to_ascii_lowercase()),
        }
    }

    /// Lower-cased name of the trusted user header, if any.
    pub fn trusted_user_header(&self) -> Option<&str> {
        self.trusted_user_header.as_deref()
    }

    /// Resolve the caller, or fail as unauthorized.
    pub async fn resolve(&self, credentials: &CallerCredentials) -> AppResult<UserId> {
        if self.trusted_user_header.is_some() {
            if let Some(user) = credentials
                .asserted_user
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
            {
                return Ok(UserId::from(user));
            }
        }

        let Some(token) = credentials.bearer.as_deref().filter(|t| !t.is_empty()) else {
            return Err(AppError::unauthorized("Missing token in request header"));
        };

        match self.links.find_owner_by_management_token(token).await? {
            Some(user) => Ok(user),
            None => {
                debug!("Bearer token did not match any management token");
                Err(AppError::unauthorized("Invalid token"))
            }
        }
    }
}
