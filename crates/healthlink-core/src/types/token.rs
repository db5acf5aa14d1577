//! Random secrets and content addressing.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use super::id::ContentHash;

/// Number of random bytes behind every generated secret.
pub const TOKEN_BYTES: usize = 32;

/// Generate 32 bytes from the operating system CSPRNG, base64url encoded
/// without padding (43 characters).
pub fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a raw 32-byte key.
pub fn random_key_bytes() -> [u8; TOKEN_BYTES] {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

impl ContentHash {
    /// Compute the content address of a blob.
    pub fn compute(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        Self(URL_SAFE_NO_PAD.encode(digest))
    }
}
