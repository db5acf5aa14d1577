//! Compact JWE encryption of endpoint payloads.
//!
//! Payloads use direct key agreement (`alg: dir`) with AES-256-GCM
//! (`enc: A256GCM`), keyed by the endpoint's stored base64url key. The
//! compact form is `header..iv.ciphertext.tag` with an empty encrypted-key
//! segment, and the base64url header is the additional authenticated data.

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::{Aead, KeyInit, Nonce, Payload};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde_json::{Map, Value, json};

use healthlink_core::error::AppError;
use healthlink_core::result::AppResult;
use healthlink_entity::endpoint::Endpoint;

/// Protected header of every payload.
const PROTECTED_HEADER: &str = r#"{"alg":"dir","enc":"A256GCM"}"#;

/// AES-256 key size.
pub const KEY_SIZE: usize = 32;

/// GCM IV size.
pub const IV_SIZE: usize = 12;

/// GCM tag size.
pub const TAG_SIZE: usize = 16;

/// JSON handed to the recipient: `aud` plus every member of the cached
/// token response.
pub fn endpoint_claims(endpoint: &Endpoint) -> AppResult<Value> {
    let mut claims = Map::new();
    claims.insert("aud".into(), json!(endpoint.endpoint_url));
    if let Some(token) = endpoint.token() {
        if let Value::Object(members) = serde_json::to_value(token)? {
            claims.extend(members);
        }
    }
    Ok(Value::Object(claims))
}

/// Encrypt the endpoint's claims with its own key.
pub fn encrypt_endpoint(endpoint: &Endpoint) -> AppResult<String> {
    let claims = serde_json::to_vec(&endpoint_claims(endpoint)?)?;
    encrypt_compact(&endpoint.config.key, &claims)
}

/// Encrypt `plaintext` into a compact JWE with a base64url-encoded key.
pub fn encrypt_compact(key_b64: &str, plaintext: &[u8]) -> AppResult<String> {
    let key = URL_SAFE_NO_PAD
        .decode(key_b64.trim_end_matches('='))
        .map_err(|_| AppError::bad_request("Endpoint key is not valid base64url"))?;
    if key.len() != KEY_SIZE {
        return Err(AppError::bad_request(format!(
            "Endpoint key must be {KEY_SIZE} bytes"
        )));
    }
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|_| AppError::internal("Invalid payload key length"))?;

    let header = URL_SAFE_NO_PAD.encode(PROTECTED_HEADER);
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);

    let mut sealed = cipher
        .encrypt(
            Nonce::<Aes256Gcm>::from_slice(&iv),
            Payload {
                msg: plaintext,
                aad: header.as_bytes(),
            },
        )
        .map_err(|_| AppError::internal("Payload encryption failed"))?;
    let tag = sealed.split_off(sealed.len() - TAG_SIZE);

    Ok(format!(
        "{header}..{}.{}.{}",
        URL_SAFE_NO_PAD.encode(iv),
        URL_SAFE_NO_PAD.encode(&sealed),
        URL_SAFE_NO_PAD.encode(tag),
    ))
}
