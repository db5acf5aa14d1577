//! Endpoint repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;

use healthlink_core::error::{AppError, ErrorKind};
use healthlink_core::result::AppResult;
use healthlink_core::types::{EndpointId, LinkId};
use healthlink_entity::endpoint::Endpoint;

const ENDPOINT_COLUMNS: &str = "SELECT id, link_id, endpoint_url, config_key, config_client_id, \
     config_client_secret, config_token_endpoint, config_refresh_token, access_token_response, \
     refresh_time FROM link_endpoints";

/// Repository for managed API endpoints and their token state.
#[derive(Debug, Clone)]
pub struct EndpointRepository {
    pool: SqlitePool,
}

impl EndpointRepository {
    /// Create a new endpoint repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a fully populated endpoint.
    pub async fn create(&self, endpoint: &Endpoint) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO link_endpoints (id, link_id, endpoint_url, config_key, config_client_id, \
             config_client_secret, config_token_endpoint, config_refresh_token, refresh_time, \
             access_token_response, added_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&endpoint.id)
        .bind(&endpoint.link_id)
        .bind(&endpoint.endpoint_url)
        .bind(&endpoint.config.key)
        .bind(&endpoint.config.client_id)
        .bind(&endpoint.config.client_secret)
        .bind(&endpoint.config.token_endpoint)
        .bind(&endpoint.config.refresh_token)
        .bind(endpoint.refresh_time)
        .bind(endpoint.token().map(Json))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create endpoint", e))?;
        Ok(())
    }

    /// Persist refreshed token state.
    pub async fn update_token(&self, endpoint: &Endpoint) -> AppResult<()> {
        sqlx::query(
            "UPDATE link_endpoints SET config_refresh_token = ?, refresh_time = ?, \
             access_token_response = ? WHERE id = ?",
        )
        .bind(&endpoint.config.refresh_token)
        .bind(endpoint.refresh_time)
        .bind(endpoint.token().map(Json))
        .bind(&endpoint.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update endpoint", e))?;
        Ok(())
    }

    /// Find an endpoint of a link.
    pub async fn find(&self, link_id: &LinkId, id: &EndpointId) -> AppResult<Option<Endpoint>> {
        sqlx::query_as::<_, Endpoint>(&format!("{ENDPOINT_COLUMNS} WHERE link_id = ? AND id = ?"))
            .bind(link_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find endpoint", e))
    }

    /// IDs of every endpoint of a link, in insertion order.
    pub async fn list_ids(&self, link_id: &LinkId) -> AppResult<Vec<EndpointId>> {
        sqlx::query_scalar::<_, EndpointId>(
            "SELECT id FROM link_endpoints WHERE link_id = ? ORDER BY added_at, rowid",
        )
        .bind(link_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list endpoints", e))
    }
}
