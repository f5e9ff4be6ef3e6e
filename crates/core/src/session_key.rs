//! Public session identifiers.
//!
//! Sessions are addressed by a short random key rather than their numeric
//! id. Keys are 16 characters from `A-Z0-9`.

use rand::Rng;

/// Length of a generated session key.
pub const SESSION_KEY_LENGTH: usize = 16;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a new random session key.
pub fn generate_session_key() -> String {
    let mut rng = rand::rng();
    (0..SESSION_KEY_LENGTH)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Whether `key` has the shape of a generated session key.
pub fn is_valid_session_key(key: &str) -> bool {
    key.len() == SESSION_KEY_LENGTH
        && key
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
