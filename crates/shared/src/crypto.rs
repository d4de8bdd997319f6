//! Session token generation and hashing.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a session token (hex encoded to 64 chars).
const SESSION_TOKEN_BYTES: usize = 32;

/// Computes SHA-256 hash of the input and returns it as a hex string.
///
/// Session tokens are only ever stored in this hashed form.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a new random session token prefixed with `ts_`.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("ts_{}", hex::encode(bytes))
}

/// Returns true if the value has the shape of a token from [`generate_session_token`].
pub fn is_session_token_format(token: &str) -> bool {
    token
        .strip_prefix("ts_")
        .map(|rest| rest.len() == SESSION_TOKEN_BYTES * 2 && rest.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}
