//! Argon2id password hashing and verification.
//!
//! All password hashes use the Argon2id variant with a random salt generated
//! via [`OsRng`]. The PHC string format embeds algorithm parameters and salt
//! in the hash itself.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use nextmove_core::validation::validate_password;

use crate::error::{AppError, AppResult};

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default(); // Argon2id with default params
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted Argon2id hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check length rules and hash a new password for storage.
pub fn hash_new_password(password: &str) -> AppResult<String> {
    validate_password(password)?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// Verify a password, mapping hash-format errors to a 500.
pub fn check_password(password: &str, hash: &str) -> AppResult<bool> {
    verify_password(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use nextmove_core::error::CoreError;

    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");

        assert!(hash.starts_with("$argon2id$"), "expected argon2id PHC prefix");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password("real-password").expect("hashing should succeed");
        let verified = verify_password("wrong-password", &hash).expect("verify should succeed");
        assert!(!verified, "wrong password should verify as false");
    }

    #[test]
    fn test_short_new_password_is_rejected() {
        assert_matches!(
            hash_new_password("kurz"),
            Err(AppError::Core(CoreError::Validation(msg))) if msg.contains("at least 8")
        );
    }

    #[test]
    fn test_new_password_at_minimum_is_hashed() {
        let hash = hash_new_password("acht1234").expect("8 characters should pass");
        assert!(check_password("acht1234", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        assert_matches!(
            check_password("whatever1", "not-a-phc-string"),
            Err(AppError::InternalError(_))
        );
    }
}
