//! Endpoint entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use healthlink_core::types::{EndpointId, LinkId};

/// OAuth client settings and payload key of an endpoint.
#[derive(Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OAuthConfig {
    /// Base64url 32-byte key used to encrypt the endpoint payload.
    #[sqlx(rename = "config_key")]
    pub key: String,
    /// OAuth client id.
    #[sqlx(rename = "config_client_id")]
    pub client_id: String,
    /// OAuth client secret.
    #[sqlx(rename = "config_client_secret")]
    pub client_secret: String,
    /// Token endpoint URL.
    #[sqlx(rename = "config_token_endpoint")]
    pub token_endpoint: String,
    /// Current refresh token. Rotated when the server issues a new one.
    #[sqlx(rename = "config_refresh_token")]
    pub refresh_token: String,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("token_endpoint", &self.token_endpoint)
            .finish_non_exhaustive()
    }
}

/// Token response from the authorization server.
///
/// Unknown members (`expires_in`, `patient`, ...) are preserved so they
/// reach the recipient inside the endpoint payload.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// Bearer token for the upstream API.
    pub access_token: String,
    /// Granted scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Rotated refresh token. Never persisted in this struct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Any other members of the response.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl std::fmt::Debug for AccessTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenResponse")
            .field("scope", &self.scope)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// A proxied OAuth-protected API attached to a link.
#[derive(Debug, Clone, FromRow)]
pub struct Endpoint {
    /// Endpoint identifier.
    pub id: EndpointId,
    /// Owning link.
    pub link_id: LinkId,
    /// Upstream API base URL; becomes `aud` in the payload.
    pub endpoint_url: String,
    /// OAuth settings.
    #[sqlx(flatten)]
    pub config: OAuthConfig,
    /// Cached token response.
    pub access_token_response: Option<Json<AccessTokenResponse>>,
    /// Instant at which the cached response turns stale.
    pub refresh_time: Option<DateTime<Utc>>,
}

impl Endpoint {
    /// Whether the cached token must be refreshed before use.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token_response, self.refresh_time) {
            (Some(_), Some(refresh_time)) => now >= refresh_time,
            _ => true,
        }
    }

    /// The cached token response, if any.
    pub fn token(&self) -> Option<&AccessTokenResponse> {
        self.access_token_response.as_ref().map(|json| &json.0)
    }

    /// Store a token response obtained from the authorization server.
    ///
    /// A rotated refresh token moves into `config` and is removed from the
    /// cached response, so it is kept in exactly one place.
    pub fn apply_refresh(&mut self, mut response: AccessTokenResponse, refresh_time: DateTime<Utc>) {
        if let Some(rotated) = response.refresh_token.take() {
            self.config.refresh_token = rotated;
        }
        self.access_token_response = Some(Json(response));
        self.refresh_time = Some(refresh_time);
    }

    /// Build an endpoint from an owner submission, before its first refresh.
    pub fn from_new(id: EndpointId, link_id: LinkId, new: NewEndpoint) -> Self {
        Self {
            id,
            link_id,
            endpoint_url: new.endpoint_url,
            config: new.config,
            access_token_response: None,
            refresh_time: None,
        }
    }
}

/// Endpoint submitted by an owner.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEndpoint {
    /// Upstream API base URL.
    pub endpoint_url: String,
    /// OAuth settings with the initial refresh token.
    pub config: OAuthConfig,
}
