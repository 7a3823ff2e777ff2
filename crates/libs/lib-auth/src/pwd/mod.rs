//! # Password Hashing
//!
//! Password hashing and verification using Argon2.
//!
//! Hashing is deliberately slow (memory-hard KDF with a per-password random
//! salt) so stored digests resist brute forcing. Callers on an async runtime
//! should run these on a blocking thread.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

/// Minimum accepted plaintext length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Errors produced by password hashing and verification.
#[derive(Debug, Error)]
pub enum PwdError {
    #[error("password must be at least {MIN_PASSWORD_LEN} characters long")]
    TooShort,

    #[error("failed to hash password: {0}")]
    Hash(String),

    /// The stored digest could not be parsed as a PHC string.
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hash a plaintext password using Argon2 with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PwdError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(PwdError::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PwdError::Hash(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Verify a plaintext password against a stored Argon2 digest.
///
/// Returns `Ok(false)` for a well-formed digest that does not match; an error
/// only when the stored digest itself cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PwdError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PwdError::MalformedHash(e.to_string()))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
