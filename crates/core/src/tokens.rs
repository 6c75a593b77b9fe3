//! Random one-time tokens and their SHA-256 digests.
//!
//! Password-reset links carry a random alphanumeric token. Only its digest is
//! stored, so the plaintext exists solely in the email sent to the customer.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of a generated password-reset token.
pub const RESET_TOKEN_LENGTH: usize = 48;

/// How long a password-reset token stays valid.
pub const RESET_TOKEN_TTL_SECS: i64 = 60 * 60;

/// A freshly generated token and the digest to persist.
#[derive(Debug, Clone)]
pub struct GeneratedToken {
    /// Sent to the user exactly once, never stored.
    pub plaintext: String,
    /// SHA-256 hex digest of `plaintext`.
    pub hash: String,
}

/// Generate a random alphanumeric token of `len` characters.
pub fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a password-reset token.
pub fn generate_reset_token() -> GeneratedToken {
    let plaintext = random_token(RESET_TOKEN_LENGTH);
    let hash = sha256_hex(plaintext.as_bytes());
    GeneratedToken { plaintext, hash }
}

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Digest of a token as received from a client.
pub fn hash_token(token: &str) -> String {
    sha256_hex(token.trim().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn reset_token_hash_matches_plaintext() {
        let token = generate_reset_token();
        assert_eq!(token.plaintext.len(), RESET_TOKEN_LENGTH);
        assert!(token.plaintext.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(hash_token(&token.plaintext), token.hash);
        assert_eq!(token.hash.len(), 64);
    }

    #[test]
    fn tokens_are_unique() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(hash_token(" abc\n"), hash_token("abc"));
    }
}
