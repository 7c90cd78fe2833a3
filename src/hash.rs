//! Salted SHA-1 credential scheme
//!
//! Stored credentials have the form `salt:hexdigest` where the digest is
//! `sha1(salt || password)` in lowercase hex. This is the scheme existing
//! stores were provisioned with; it is kept for compatibility, not
//! recommended for new designs.

use anyhow::{bail, Result};
use rand::Rng;
use sha1::{Digest, Sha1};

/// Length of the random salt, in characters.
pub const SALT_LEN: usize = 6;

const SALT_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generate a random ASCII-letter salt.
pub fn generate_salt() -> String {
    let mut rng = rand::thread_rng();
    (0..SALT_LEN)
        .map(|_| SALT_CHARS[rng.gen_range(0..SALT_CHARS.len())] as char)
        .collect()
}

/// Compute the hex digest of `sha1(salt || password)`.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Produce the stored `salt:hexdigest` form for a fresh password.
pub fn encode_credential(salt: &str, password: &str) -> String {
    format!("{salt}:{}", hash_password(salt, password))
}

/// Check a plaintext password against a stored `salt:hexdigest` value.
///
/// A stored value without the colon delimiter is malformed and reported as
/// an error so callers can log it apart from an ordinary mismatch. The hash
/// comparison is plain string equality, not constant-time.
pub fn verify_credential(stored: &str, password: &str) -> Result<bool> {
    let Some((salt, digest)) = stored.split_once(':') else {
        bail!("stored credential is not in salt:hash form");
    };
    Ok(hash_password(salt, password) == digest)
}
