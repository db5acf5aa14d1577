//! OAuth token endpoint client.

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use healthlink_core::config::EndpointConfig;
use healthlink_core::error::{AppError, ErrorKind};
use healthlink_core::result::AppResult;
use healthlink_entity::endpoint::{AccessTokenResponse, OAuthConfig};

/// Performs `grant_type=refresh_token` requests.
#[async_trait]
pub trait TokenClient: Send + Sync + Debug + 'static {
    /// Exchange the refresh token in `config` for a new access token.
    async fn refresh(&self, config: &OAuthConfig) -> AppResult<AccessTokenResponse>;
}

/// [`TokenClient`] over HTTP with client credentials in Basic auth.
#[derive(Debug, Clone)]
pub struct HttpTokenClient {
    client: Client,
}

impl HttpTokenClient {
    /// Creates a client whose requests time out per `config`.
    pub fn new(config: &EndpointConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TokenClient for HttpTokenClient {
    async fn refresh(&self, config: &OAuthConfig) -> AppResult<AccessTokenResponse> {
        debug!(token_endpoint = %config.token_endpoint, "Requesting access token");
        let response = self
            .client
            .post(&config.token_endpoint)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", config.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(token_endpoint = %config.token_endpoint, error = %e, "Token request failed");
                AppError::with_source(ErrorKind::ExternalService, "Token request failed", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(token_endpoint = %config.token_endpoint, %status, "Token endpoint rejected refresh");
            return Err(AppError::external_service(format!(
                "Token endpoint responded with {status}"
            )));
        }

        response.json::<AccessTokenResponse>().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Invalid token response", e)
        })
    }
}
