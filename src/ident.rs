//! Identifier generation: random tokens and v4 UUIDs.

use rand::Rng;
use rand::rngs::OsRng;
use uuid::Uuid;

const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A lowercase-alphanumeric token of `len` characters, drawn from the OS
/// CSPRNG.
pub fn random_token(len: usize) -> String {
    let mut rng = OsRng;
    (0..len)
        .map(|_| TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

/// A fresh v4 UUID in hyphenated form.
pub fn unique_id() -> String {
    Uuid::new_v4().to_string()
}
