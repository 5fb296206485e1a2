//! API key generation and hashing (spec §4.7).
//!
//! The raw secret is shown to the caller exactly once, at creation
//! time, and never again: only a salted hash is persisted, so a
//! database leak cannot be replayed into a working key.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const KEY_PREFIX: &str = "gm_";
const SECRET_BYTES: usize = 32;

/// A freshly generated API key: the raw secret (shown once) and the
/// hash that gets persisted.
pub struct GeneratedApiKey {
    pub raw_secret: String,
    pub key_prefix: String,
    pub hashed_key_material: String,
}

/// Generate a new `gm_`-prefixed API key secret and its hash, mixing in
/// an install-wide pepper (spec §0 ambient config) so that hashes are
/// not portable across deployments.
#[must_use]
pub fn generate(pepper: &str) -> GeneratedApiKey {
    let mut secret_bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut secret_bytes);
    let encoded = URL_SAFE_NO_PAD.encode(secret_bytes);
    let raw_secret = format!("{KEY_PREFIX}{encoded}");
    let key_prefix = display_prefix(&raw_secret);
    let hashed_key_material = hash(&raw_secret, pepper);

    GeneratedApiKey {
        raw_secret,
        key_prefix,
        hashed_key_material,
    }
}

/// Salted SHA-256 hash of a raw API key secret, hex-encoded. Looking up
/// an incoming key is always `hash(raw, pepper) == stored_hash` —
/// there is no decrypt path.
#[must_use]
pub fn hash(raw_secret: &str, pepper: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pepper.as_bytes());
    hasher.update(b":");
    hasher.update(raw_secret.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// The short, non-secret prefix shown back to callers in list views so
/// they can tell keys apart without ever seeing the full secret again.
#[must_use]
pub fn display_prefix(raw_secret: &str) -> String {
    let visible = raw_secret.chars().take(KEY_PREFIX.len() + 6).collect::<String>();
    visible
}

/// Whether `candidate` looks like a well-formed Memoria API key before
/// bothering to hash and look it up.
#[must_use]
pub fn has_valid_shape(candidate: &str) -> bool {
    candidate.starts_with(KEY_PREFIX) && candidate.len() > KEY_PREFIX.len()
}
