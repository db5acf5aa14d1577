//! Content-addressed blob store.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use healthlink_core::error::{AppError, ErrorKind};
use healthlink_core::result::AppResult;
use healthlink_core::types::ContentHash;

/// Result of reading a blob under a size limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobRead {
    /// The blob fits the limit.
    Inline(Vec<u8>),
    /// The blob exists but is larger than the limit.
    TooLarge,
}

/// Blob storage keyed by the SHA-256 of the content.
///
/// Inserting existing content is a no-op. Blobs are never deleted, since
/// several links may reference the same bytes.
#[derive(Debug, Clone)]
pub struct ContentStore {
    pool: SqlitePool,
}

impl ContentStore {
    /// Create a new content store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store `content` if absent and return its hash.
    pub async fn put(&self, content: &[u8]) -> AppResult<ContentHash> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::put_with(&mut conn, content).await
    }

    /// Store `content` on an existing connection or transaction.
    pub async fn put_with(conn: &mut SqliteConnection, content: &[u8]) -> AppResult<ContentHash> {
        let hash = ContentHash::compute(content);
        sqlx::query("INSERT OR IGNORE INTO cas_items (hash, content, created_at) VALUES (?, ?, ?)")
            .bind(&hash)
            .bind(content)
            .bind(Utc::now())
            .execute(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store content", e))?;
        Ok(hash)
    }

    /// Read a blob, returning its bytes only when it is at most `size_limit` long.
    pub async fn get(&self, hash: &ContentHash, size_limit: u64) -> AppResult<Option<BlobRead>> {
        let limit = i64::try_from(size_limit).unwrap_or(i64::MAX);
        let row: Option<(Option<Vec<u8>>,)> = sqlx::query_as(
            "SELECT CASE WHEN length(content) <= ? THEN content END FROM cas_items WHERE hash = ?",
        )
        .bind(limit)
        .bind(hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read content", e))?;

        Ok(row.map(|(content,)| match content {
            Some(bytes) => BlobRead::Inline(bytes),
            None => BlobRead::TooLarge,
        }))
    }
}
