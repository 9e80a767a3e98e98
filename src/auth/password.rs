/*!
 * Password hashing with Argon2id.
 *
 * Hashes are stored as PHC strings, so parameters and salt travel with
 * the hash and verification needs nothing else.
 */

use anyhow::{anyhow, Result};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::RngCore;

/// Salt length in bytes
const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| anyhow!("Failed to encode password salt: {}", e))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
