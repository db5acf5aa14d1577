//! Public link representations.
//!
//! [`LinkPublic`] is what a recipient learns from the shareable URI.
//! [`LinkFull`] is the owner's view, and [`LinkFullFlat`] is its wire
//! projection with the config fields lifted to the top level.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use healthlink_core::types::LinkId;

use super::model::LinkConfig;
use crate::file::FileSummary;

/// URI scheme prefix of a shareable link.
pub const SHLINK_PREFIX: &str = "shlink:/";

/// Public record of a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LinkPublic {
    /// Link identifier.
    #[sqlx(rename = "link_id")]
    pub id: LinkId,
    /// Manifest URL.
    #[sqlx(rename = "manifest_url")]
    pub url: String,
    /// 43-character base64url encryption key.
    #[sqlx(rename = "encryption_key")]
    pub key: String,
    /// Capability flags (`P` when a passcode is required).
    pub flag: String,
    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Payload version.
    #[sqlx(rename = "version")]
    pub v: i64,
}

/// Owner view of a link including config, files, and management token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFull {
    /// Public record.
    #[serde(flatten)]
    pub public: LinkPublic,
    /// Files currently associated with the link.
    pub files: Vec<FileSummary>,
    /// Expiration and passcode.
    pub config: LinkConfig,
    /// Owner capability credential.
    pub management_token: String,
}

/// [`LinkFull`] with `exp` and `passcode` lifted out of `config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFullFlat {
    /// Link identifier.
    pub id: LinkId,
    /// Manifest URL.
    pub url: String,
    /// Encryption key.
    pub key: String,
    /// Capability flags.
    pub flag: String,
    /// Label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Payload version.
    pub v: i64,
    /// Expiration as unix seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Passcode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
    /// Files currently associated with the link.
    pub files: Vec<FileSummary>,
    /// Owner capability credential.
    pub management_token: String,
    /// Shareable `shlink:/` URI.
    pub shlink: String,
}

/// The JSON object encoded into a `shlink:/` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShlinkPayload {
    /// Link identifier.
    pub id: LinkId,
    /// Manifest URL.
    pub url: String,
    /// Encryption key.
    pub key: String,
    /// Expiration as unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Capability flags.
    pub flag: String,
    /// Label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Payload version.
    pub v: i64,
}

impl ShlinkPayload {
    /// Encode as `shlink:/` followed by base64url JSON.
    pub fn to_uri(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(format!("{SHLINK_PREFIX}{}", URL_SAFE_NO_PAD.encode(json)))
    }
}

impl LinkFull {
    /// Fields a recipient needs to resolve the link.
    pub fn payload(&self) -> ShlinkPayload {
        ShlinkPayload {
            id: self.public.id.clone(),
            url: self.public.url.clone(),
            key: self.public.key.clone(),
            exp: self.config.exp,
            flag: self.public.flag.clone(),
            label: self.public.label.clone(),
            v: self.public.v,
        }
    }

    /// The shareable `shlink:/` URI.
    pub fn shlink_uri(&self) -> Result<String, serde_json::Error> {
        self.payload().to_uri()
    }

    /// Flatten into the owner-facing wire shape.
    pub fn into_flat(self) -> Result<LinkFullFlat, serde_json::Error> {
        let shlink = self.shlink_uri()?;
        Ok(LinkFullFlat {
            id: self.public.id,
            url: self.public.url,
            key: self.public.key,
            flag: self.public.flag,
            label: self.public.label,
            v: self.public.v,
            exp: self.config.exp,
            passcode: self.config.passcode,
            files: self.files,
            management_token: self.management_token,
            shlink,
        })
    }
}
