//! Salted, iterated SHA-256 password digests.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Fresh random salt
pub fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// SHA-256 rounds per password digest
pub const HASH_ROUNDS: u32 = 100_000;

/// Hex digest of `salt || password`, re-hashed `HASH_ROUNDS` times with the
/// previous digest prepended
pub fn hash_password(password: &str, salt: &str) -> String {
    stretch(password, salt, HASH_ROUNDS)
}

fn stretch(password: &str, salt: &str, rounds: u32) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..rounds {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt.as_bytes())
            .chain_update(password.as_bytes())
            .finalize();
    }
    hex::encode(digest)
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt).eq_ignore_ascii_case(expected_hash)
}
