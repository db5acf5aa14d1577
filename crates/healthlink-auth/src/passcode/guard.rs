//! Passcode and expiry gate for manifest requests.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use healthlink_core::error::AppError;
use healthlink_core::result::AppResult;
use healthlink_core::types::LinkId;
use healthlink_database::repositories::LinkRepository;
use healthlink_entity::link::Link;

/// Outcome of evaluating a link's gate against a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Access granted.
    Grant,
    /// Unknown, inactive, or expired.
    NotFound,
    /// A passcode is configured but none was supplied.
    PasscodeRequired {
        /// Attempts left.
        remaining: u32,
    },
    /// The supplied passcode is wrong and an attempt must be consumed.
    IncorrectPasscode,
    /// No attempts left; denied without consuming another.
    Locked,
}

impl GateDecision {
    /// Evaluate the gate. Active state and expiry are checked before the
    /// passcode so a dead link never reveals whether it had one.
    pub fn evaluate(link: Option<&Link>, supplied: Option<&str>, now: DateTime<Utc>) -> Self {
        let Some(link) = link else {
            return Self::NotFound;
        };
        if !link.active || link.config.is_expired_at(now) {
            return Self::NotFound;
        }
        let Some(expected) = link.config.effective_passcode() else {
            return Self::Grant;
        };
        let Some(supplied) = supplied else {
            return Self::PasscodeRequired {
                remaining: link.remaining_attempts(),
            };
        };
        if link.passcode_failures_remaining <= 0 {
            return Self::Locked;
        }
        if supplied == expected {
            Self::Grant
        } else {
            Self::IncorrectPasscode
        }
    }
}

/// Applies [`GateDecision`] to stored links and records failed attempts.
#[derive(Debug, Clone)]
pub struct PasscodeGuard {
    links: LinkRepository,
}

impl PasscodeGuard {
    /// Creates a new guard over the link repository.
    pub fn new(links: LinkRepository) -> Self {
        Self { links }
    }

    /// Returns the link when the gate admits the request, or the typed
    /// denial otherwise. A wrong passcode is recorded before the denial is
    /// built, so the reported count includes it.
    pub async fn admit(&self, id: &LinkId, supplied: Option<&str>) -> AppResult<Link> {
        let link = self.links.find_by_id(id).await?;
        match GateDecision::evaluate(link.as_ref(), supplied, Utc::now()) {
            GateDecision::Grant => link.ok_or_else(|| AppError::internal("Granted without a link")),
            GateDecision::NotFound => Err(AppError::not_found(
                "SHL does not exist or has been deactivated.",
            )),
            GateDecision::PasscodeRequired { remaining } => {
                Err(AppError::passcode_required(remaining))
            }
            GateDecision::Locked => {
                warn!(link_id = %id, "Passcode attempt on exhausted link");
                Err(AppError::incorrect_passcode(0))
            }
            GateDecision::IncorrectPasscode => {
                let remaining = self.links.record_passcode_failure(id).await?.unwrap_or(0);
                info!(link_id = %id, remaining, "Incorrect passcode");
                Err(AppError::incorrect_passcode(
                    u32::try_from(remaining).unwrap_or(0),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthlink_core::config::DatabaseConfig;
    use healthlink_core::error::ErrorKind;
    use healthlink_core::types::UserId;
    use healthlink_database::DatabasePool;
    use healthlink_database::migration::run_migrations;
    use healthlink_entity::link::LinkConfig;

    fn link(active: bool, passcode: Option<&str>, exp: Option<i64>, remaining: i64) -> Link {
        Link {
            id: LinkId::from("l"),
            management_token: "m".into(),
            active,
            config: LinkConfig {
                passcode: passcode.map(str::to_string),
                exp,
                label: None,
            },
            passcode_failures_remaining: remaining,
            user_id: UserId::from("u"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_evaluation_order() {
        let now = Utc::now();
        let past = Some(now.timestamp() - 10);

        assert_eq!(GateDecision::evaluate(None, None, now), GateDecision::NotFound);
        assert_eq!(
            GateDecision::evaluate(Some(&link(false, Some("1"), None, 5)), Some("1"), now),
            GateDecision::NotFound
        );
        assert_eq!(
            GateDecision::evaluate(Some(&link(true, Some("1"), past, 5)), None, now),
            GateDecision::NotFound
        );
        assert_eq!(
            GateDecision::evaluate(Some(&link(true, Some("1"), None, 3)), None, now),
            GateDecision::PasscodeRequired { remaining: 3 }
        );
        assert_eq!(
            GateDecision::evaluate(Some(&link(true, Some("1"), None, 3)), Some("2"), now),
            GateDecision::IncorrectPasscode
        );
        assert_eq!(
            GateDecision::evaluate(Some(&link(true, Some("1"), None, 3)), Some("1"), now),
            GateDecision::Grant
        );
        assert_eq!(
            GateDecision::evaluate(Some(&link(true, Some("1"), None, 3)), Some(""), now),
            GateDecision::IncorrectPasscode
        );
        assert_eq!(
            GateDecision::evaluate(Some(&link(true, Some("1"), None, 0)), Some("1"), now),
            GateDecision::Locked
        );
        assert_eq!(
            GateDecision::evaluate(Some(&link(true, Some(""), None, 5)), None, now),
            GateDecision::Grant
        );
        assert_eq!(
            GateDecision::evaluate(Some(&link(true, None, None, 5)), Some("anything"), now),
            GateDecision::Grant
        );
    }

    #[tokio::test]
    async fn test_five_failures_then_floor() {
        let db = DatabasePool::in_memory().await.expect("db");
        let links = LinkRepository::new(db.into_pool(), "http://localhost:8888");
        let guard = PasscodeGuard::new(links.clone());
        let id = links
            .create(
                LinkConfig {
                    passcode: Some("1234".into()),
                    ..Default::default()
                },
                &UserId::from("alice"),
            )
            .await
            .expect("create")
            .public
            .id;

        for expected in [4, 3, 2, 1, 0] {
            let err = guard.admit(&id, Some("wrong")).await.expect_err("denied");
            assert_eq!(err.kind, ErrorKind::IncorrectPasscode);
            assert_eq!(err.remaining_attempts(), Some(expected));
        }

        let err = guard.admit(&id, Some("wrong")).await.expect_err("denied");
        assert_eq!(err.remaining_attempts(), Some(0));
        let err = guard.admit(&id, Some("1234")).await.expect_err("locked");
        assert_eq!(err.kind, ErrorKind::IncorrectPasscode);
        assert_eq!(err.remaining_attempts(), Some(0));

        let stored = links.find_by_id(&id).await.expect("find").expect("exists");
        assert_eq!(stored.passcode_failures_remaining, 0);

        links.reactivate(&id).await.expect("reactivate");
        assert!(guard.admit(&id, Some("1234")).await.is_ok());
    }

    #[tokio::test]
    async fn test_inactive_hides_passcode_requirement() {
        let db = DatabasePool::in_memory().await.expect("db");
        let links = LinkRepository::new(db.into_pool(), "http://localhost:8888");
        let guard = PasscodeGuard::new(links.clone());
        let id = links
            .create(
                LinkConfig {
                    passcode: Some("1234".into()),
                    ..Default::default()
                },
                &UserId::from("alice"),
            )
            .await
            .expect("create")
            .public
            .id;
        links.deactivate(&id).await.expect("deactivate");

        for supplied in [None, Some("1234"), Some("wrong")] {
            let err = guard.admit(&id, supplied).await.expect_err("denied");
            assert_eq!(err.kind, ErrorKind::NotFound);
        }
        let unknown = guard
            .admit(&LinkId::from("nope"), None)
            .await
            .expect_err("denied");
        assert_eq!(unknown.kind, ErrorKind::NotFound);
        assert_eq!(unknown.message, "SHL does not exist or has been deactivated.");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_failures_each_consume_one_attempt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = DatabasePool::connect(&DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", dir.path().join("gate.db").display()),
            max_connections: 8,
            connect_timeout_seconds: 10,
        })
        .await
        .expect("db");
        run_migrations(db.pool()).await.expect("migrate");
        let links = LinkRepository::new(db.pool().clone(), "http://localhost:8888");
        let guard = PasscodeGuard::new(links.clone());
        let id = links
            .create(
                LinkConfig {
                    passcode: Some("1234".into()),
                    ..Default::default()
                },
                &UserId::from("alice"),
            )
            .await
            .expect("create")
            .public
            .id;

        let attempts = 4;
        let handles: Vec<_> = (0..attempts)
            .map(|_| {
                let guard = guard.clone();
                let id = id.clone();
                tokio::spawn(async move { guard.admit(&id, Some("wrong")).await })
            })
            .collect();

        let mut reported = Vec::new();
        for handle in handles {
            let err = handle.await.expect("join").expect_err("denied");
            assert_eq!(err.kind, ErrorKind::IncorrectPasscode);
            reported.push(err.remaining_attempts().expect("remaining"));
        }
        reported.sort_unstable();
        assert_eq!(reported, vec![1, 2, 3, 4]);

        let stored = links.find_by_id(&id).await.expect("find").expect("exists");
        assert_eq!(stored.passcode_failures_remaining, 5 - attempts);
        db.close().await;
    }
}
