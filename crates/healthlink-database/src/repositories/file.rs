//! Link-file association repository.

use chrono::Utc;
use sqlx::SqlitePool;

use healthlink_core::error::{AppError, ErrorKind};
use healthlink_core::result::AppResult;
use healthlink_core::types::{ContentHash, LinkId};
use healthlink_entity::file::{FileSummary, LinkFile, ManifestFile, NewFile};

use super::content::{BlobRead, ContentStore};

/// Repository for the files attached to links.
///
/// Removing a file drops only the association; the blob stays in the
/// [`ContentStore`].
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: SqlitePool,
    content: ContentStore,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            content: ContentStore::new(pool.clone()),
            pool,
        }
    }

    /// Store the bytes and associate them with the link in one transaction.
    /// Re-adding identical content to the same link is a no-op.
    pub async fn add(&self, link_id: &LinkId, file: &NewFile) -> AppResult<ContentHash> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let hash = ContentStore::put_with(&mut tx, &file.content).await?;

        sqlx::query(
            "INSERT OR IGNORE INTO link_files (link_id, content_hash, content_type, label, added_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(link_id)
        .bind(&hash)
        .bind(&file.content_type)
        .bind(&file.label)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to attach file", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit file upload", e)
        })?;
        Ok(hash)
    }

    /// Detach one file from a link. Returns whether an association existed.
    pub async fn remove(&self, link_id: &LinkId, hash: &ContentHash) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM link_files WHERE link_id = ? AND content_hash = ?")
            .bind(link_id)
            .bind(hash)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to detach file", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Detach every file from a link.
    pub async fn remove_all(&self, link_id: &LinkId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM link_files WHERE link_id = ?")
            .bind(link_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to detach files", e))?;
        Ok(result.rows_affected())
    }

    /// Associations of a link in insertion order.
    pub async fn list(&self, link_id: &LinkId) -> AppResult<Vec<LinkFile>> {
        sqlx::query_as::<_, LinkFile>(
            "SELECT link_id, content_hash, content_type, label, added_at FROM link_files \
             WHERE link_id = ? ORDER BY added_at, rowid",
        )
        .bind(link_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    /// File summaries of a link.
    pub async fn summaries(&self, link_id: &LinkId) -> AppResult<Vec<FileSummary>> {
        load_summaries(&self.pool, link_id).await
    }

    /// Files of a link for a manifest, with content inlined when the
    /// [`ContentStore`] reports it within `embed_limit` bytes.
    pub async fn list_for_manifest(
        &self,
        link_id: &LinkId,
        embed_limit: u64,
    ) -> AppResult<Vec<ManifestFile>> {
        let attached = self.list(link_id).await?;
        let mut files = Vec::with_capacity(attached.len());
        for file in attached {
            let content = match self.content.get(&file.content_hash, embed_limit).await? {
                Some(BlobRead::Inline(bytes)) => Some(bytes),
                Some(BlobRead::TooLarge) => None,
                None => {
                    return Err(AppError::internal(format!(
                        "Blob {} attached to link {link_id} is missing",
                        file.content_hash
                    )));
                }
            };
            files.push(ManifestFile {
                content_type: file.content_type,
                content_hash: file.content_hash,
                content,
            });
        }
        Ok(files)
    }

    /// Bytes of a file, only if it is attached to the link.
    pub async fn fetch(&self, link_id: &LinkId, hash: &ContentHash) -> AppResult<Option<Vec<u8>>> {
        sqlx::query_scalar::<_, Vec<u8>>(
            "SELECT c.content FROM link_files f JOIN cas_items c ON c.hash = f.content_hash \
             WHERE f.link_id = ? AND f.content_hash = ?",
        )
        .bind(link_id)
        .bind(hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read file", e))
    }
}

pub(crate) async fn load_summaries(
    pool: &SqlitePool,
    link_id: &LinkId,
) -> AppResult<Vec<FileSummary>> {
    let files = sqlx::query_as::<_, LinkFile>(
        "SELECT link_id, content_hash, content_type, label, added_at FROM link_files \
         WHERE link_id = ? ORDER BY added_at, rowid",
    )
    .bind(link_id)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load file summaries", e))?;
    Ok(files.into_iter().map(FileSummary::from).collect())
}
