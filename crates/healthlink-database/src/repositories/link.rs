//! Link repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;
use subtle::ConstantTimeEq;

use healthlink_core::error::{AppError, ErrorKind};
use healthlink_core::result::AppResult;
use healthlink_core::types::{LinkId, UserId, random_token};
use healthlink_entity::link::{
    DEFAULT_PASSCODE_FAILURES, Link, LinkConfig, LinkFull, LinkPublic, PASSCODE_FLAG,
};

use super::file::load_summaries;

const LINK_COLUMNS: &str = "SELECT l.id, l.management_token, l.active, l.config_passcode, \
     l.config_exp, p.label, l.passcode_failures_remaining, l.user_id, l.created_at \
     FROM links l LEFT JOIN link_public p ON p.link_id = l.id";

/// Repository for link records, their public projection, and owner lookups.
#[derive(Debug, Clone)]
pub struct LinkRepository {
    pool: SqlitePool,
    public_url: String,
}

impl LinkRepository {
    /// Create a new link repository. `public_url` is the externally
    /// visible base used to build manifest URLs.
    pub fn new(pool: SqlitePool, public_url: impl Into<String>) -> Self {
        let public_url = public_url.into().trim_end_matches('/').to_string();
        Self { pool, public_url }
    }

    /// Manifest URL of a link.
    pub fn manifest_url(&self, id: &LinkId) -> String {
        format!("{}/api/shl/{}", self.public_url, id)
    }

    /// Create a link owned by `owner`, registering the owner if new.
    pub async fn create(&self, config: LinkConfig, owner: &UserId) -> AppResult<LinkFull> {
        let id = LinkId::generate();
        let management_token = random_token();
        let key = random_token();
        let now = Utc::now();
        let flag = if config.effective_passcode().is_some() {
            PASSCODE_FLAG.to_string()
        } else {
            String::new()
        };
        let public = LinkPublic {
            url: self.manifest_url(&id),
            id,
            key,
            flag,
            label: config.label.clone(),
            v: 1,
        };

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("INSERT OR IGNORE INTO users (id, created_at) VALUES (?, ?)")
            .bind(owner)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register user", e))?;

        sqlx::query(
            "INSERT INTO links (id, management_token, active, config_exp, config_passcode, \
             passcode_failures_remaining, user_id, created_at) VALUES (?, ?, 1, ?, ?, ?, ?, ?)",
        )
        .bind(&public.id)
        .bind(&management_token)
        .bind(config.exp)
        .bind(&config.passcode)
        .bind(DEFAULT_PASSCODE_FAILURES)
        .bind(owner)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create link", e))?;

        sqlx::query(
            "INSERT INTO link_public (link_id, manifest_url, encryption_key, flag, label, version) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&public.id)
        .bind(&public.url)
        .bind(&public.key)
        .bind(&public.flag)
        .bind(&public.label)
        .bind(public.v)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create public link record", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit link creation", e)
        })?;

        Ok(LinkFull {
            public,
            files: Vec::new(),
            config: LinkConfig {
                passcode: config.passcode,
                exp: config.exp,
                label: None,
            },
            management_token,
        })
    }

    /// Find a link by ID regardless of its active state.
    pub async fn find_by_id(&self, id: &LinkId) -> AppResult<Option<Link>> {
        sqlx::query_as::<_, Link>(&format!("{LINK_COLUMNS} WHERE l.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find link", e))
    }

    /// Find a link whose management token matches `token` exactly.
    pub async fn find_managed(&self, id: &LinkId, token: &str) -> AppResult<Option<Link>> {
        Ok(self.find_by_id(id).await?.filter(|link| {
            bool::from(link.management_token.as_bytes().ct_eq(token.as_bytes()))
        }))
    }

    /// Find a link owned by `user`, active or not.
    pub async fn find_owned(&self, id: &LinkId, user: &UserId) -> AppResult<Option<Link>> {
        sqlx::query_as::<_, Link>(&format!("{LINK_COLUMNS} WHERE l.id = ? AND l.user_id = ?"))
            .bind(id)
            .bind(user)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find owned link", e))
    }

    /// Owner of a link.
    pub async fn find_owner(&self, id: &LinkId) -> AppResult<Option<UserId>> {
        sqlx::query_scalar::<_, UserId>("SELECT user_id FROM links WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find link owner", e))
    }

    /// Owner of the link holding this management token.
    pub async fn find_owner_by_management_token(&self, token: &str) -> AppResult<Option<UserId>> {
        sqlx::query_scalar::<_, UserId>("SELECT user_id FROM links WHERE management_token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to resolve management token", e)
            })
    }

    /// Whether an active link with this ID exists.
    pub async fn exists_active(&self, id: &LinkId) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE id = ? AND active = 1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check link", e))?;
        Ok(count > 0)
    }

    /// Owner view of an active link owned by `user`.
    pub async fn find_full_for_user(
        &self,
        id: &LinkId,
        user: &UserId,
    ) -> AppResult<Option<LinkFull>> {
        match self.find_owned(id, user).await? {
            Some(link) if link.active => self.to_full(link).await.map(Some),
            _ => Ok(None),
        }
    }

    /// Owner views of every active link of `user`, oldest first.
    pub async fn list_for_user(&self, user: &UserId) -> AppResult<Vec<LinkFull>> {
        let links = sqlx::query_as::<_, Link>(&format!(
            "{LINK_COLUMNS} WHERE l.user_id = ? AND l.active = 1 ORDER BY l.created_at, l.rowid"
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list links", e))?;

        let mut full = Vec::with_capacity(links.len());
        for link in links {
            full.push(self.to_full(link).await?);
        }
        Ok(full)
    }

    /// Persist new gate settings. Keeps the passcode flag in step with
    /// whether a passcode remains configured. Returns `false` when the
    /// link has no public record.
    pub async fn update_config(&self, id: &LinkId, config: &LinkConfig) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let flag: Option<String> =
            sqlx::query_scalar("SELECT flag FROM link_public WHERE link_id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to read link flag", e)
                })?;
        let Some(flag) = flag else {
            return Ok(false);
        };
        let flag = next_flag(&flag, config.effective_passcode().is_some());

        sqlx::query("UPDATE link_public SET flag = ?, label = ? WHERE link_id = ?")
            .bind(&flag)
            .bind(&config.label)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update public link", e)
            })?;

        sqlx::query("UPDATE links SET config_passcode = ?, config_exp = ? WHERE id = ?")
            .bind(&config.passcode)
            .bind(config.exp)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update link", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit link update", e)
        })?;
        Ok(true)
    }

    /// Mark a link inactive.
    pub async fn deactivate(&self, id: &LinkId) -> AppResult<bool> {
        let result = sqlx::query("UPDATE links SET active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to deactivate link", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a link active and restore its passcode attempts.
    pub async fn reactivate(&self, id: &LinkId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE links SET active = 1, passcode_failures_remaining = ? WHERE id = ?",
        )
        .bind(DEFAULT_PASSCODE_FAILURES)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reactivate link", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically consume one passcode attempt, never going below zero.
    /// Returns the remaining count, or `None` for an unknown link.
    pub async fn record_passcode_failure(&self, id: &LinkId) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE links SET passcode_failures_remaining = MAX(passcode_failures_remaining - 1, 0) \
             WHERE id = ? RETURNING passcode_failures_remaining",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record passcode failure", e)
        })
    }

    async fn to_full(&self, link: Link) -> AppResult<LinkFull> {
        let public = sqlx::query_as::<_, LinkPublic>(
            "SELECT link_id, manifest_url, encryption_key, flag, label, version \
             FROM link_public WHERE link_id = ?",
        )
        .bind(&link.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load public link", e))?
        .ok_or_else(|| AppError::internal(format!("Link {} has no public record", link.id)))?;

        let files = load_summaries(&self.pool, &link.id).await?;

        Ok(LinkFull {
            public,
            files,
            config: LinkConfig {
                passcode: link.config.passcode,
                exp: link.config.exp,
                label: None,
            },
            management_token: link.management_token,
        })
    }
}

fn next_flag(current: &str, passcode_set: bool) -> String {
    let has_flag = current.contains(PASSCODE_FLAG);
    match (passcode_set, has_flag) {
        (true, false) => format!("{current}{PASSCODE_FLAG}"),
        (false, true) => current.replace(PASSCODE_FLAG, ""),
        _ => current.to_string(),
    }
}
