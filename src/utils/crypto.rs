//! Cryptographic utilities
//!
//! Password hashing with Argon2 and random identifiers for stored files.

use crate::utils::error::{AppError, Result};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::Rng;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Crypto(format!("Failed to hash password: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Crypto(format!("Failed to parse password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Crypto(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Random decimal suffix with exactly `digits` digits, used in stored file names
pub fn random_digits(digits: u32) -> u64 {
    let low = 10u64.pow(digits.saturating_sub(1));
    let high = 10u64.pow(digits);
    rand::thread_rng().gen_range(low..high)
}
