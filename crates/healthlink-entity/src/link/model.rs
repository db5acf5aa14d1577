//! Link entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use healthlink_core::types::{LinkId, UserId};

/// Passcode attempts granted at creation and restored on reactivation.
pub const DEFAULT_PASSCODE_FAILURES: i64 = 5;

/// Flag character advertising that a link requires a passcode.
pub const PASSCODE_FLAG: char = 'P';

/// Owner-controlled gate settings of a link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LinkConfig {
    /// Passcode recipients must present. Empty means none.
    #[sqlx(rename = "config_passcode")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
    /// Expiration as unix seconds.
    #[sqlx(rename = "config_exp")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl LinkConfig {
    /// The configured passcode, treating an empty string as none.
    pub fn effective_passcode(&self) -> Option<&str> {
        self.passcode.as_deref().filter(|p| !p.is_empty())
    }

    /// Whether the link has passed its expiration instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp < now.timestamp())
    }

    /// Overlay the fields present in `update`, keeping the rest.
    pub fn merge(&mut self, update: LinkConfig) {
        if update.passcode.is_some() {
            self.passcode = update.passcode;
        }
        if update.exp.is_some() {
            self.exp = update.exp;
        }
        if update.label.is_some() {
            self.label = update.label;
        }
    }
}

/// A sharing link with its internal access criteria.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Unique link identifier.
    pub id: LinkId,
    /// Capability credential held by the owner.
    #[serde(skip_serializing)]
    pub management_token: String,
    /// Whether the link currently resolves.
    pub active: bool,
    /// Gate settings.
    #[sqlx(flatten)]
    pub config: LinkConfig,
    /// Passcode attempts left before the link locks.
    pub passcode_failures_remaining: i64,
    /// Owning user.
    pub user_id: UserId,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Remaining attempts as reported to recipients.
    pub fn remaining_attempts(&self) -> u32 {
        u32::try_from(self.passcode_failures_remaining.max(0)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_passcode_is_none() {
        let config = LinkConfig {
            passcode: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.effective_passcode(), None);
    }

    #[test]
    fn test_expiry_is_strictly_before_now() {
        let now = Utc::now();
        let past = LinkConfig {
            exp: Some(now.timestamp() - 1),
            ..Default::default()
        };
        let current = LinkConfig {
            exp: Some(now.timestamp()),
            ..Default::default()
        };
        assert!(past.is_expired_at(now));
        assert!(!current.is_expired_at(now));
        assert!(!LinkConfig::default().is_expired_at(now));
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut config = LinkConfig {
            passcode: Some("1234".into()),
            exp: Some(10),
            label: Some("labs".into()),
        };
        config.merge(LinkConfig {
            exp: Some(20),
            ..Default::default()
        });
        assert_eq!(config.passcode.as_deref(), Some("1234"));
        assert_eq!(config.exp, Some(20));
        assert_eq!(config.label.as_deref(), Some("labs"));
    }
}
