//! Database migration runner.

use sqlx::SqlitePool;
use tracing::info;

use healthlink_core::error::{AppError, ErrorKind};

/// Apply the embedded schema migrations that have not run yet.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    info!("Applying schema migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Schema migration failed: {e}"),
                e,
            )
        })?;

    info!("Schema is up to date");
    Ok(())
}
