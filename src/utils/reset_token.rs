//! Password reset token generation and hashing.
//!
//! The raw token is only ever sent to the user; storage keeps its SHA-256
//! digest so a database leak does not expose usable tokens.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of random bytes in a reset token (64 hex characters).
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
#[error("system random number generator failed: {0}")]
pub struct TokenError(String);

/// Generates a random hex-encoded reset token.
///
/// # Errors
///
/// Returns [`TokenError`] if the operating system RNG is unavailable.
pub fn generate_reset_token() -> Result<String, TokenError> {
    let mut buffer = [0u8; TOKEN_BYTES];
    getrandom::fill(&mut buffer).map_err(|e| TokenError(e.to_string()))?;
    Ok(hex::encode(buffer))
}

/// Returns the lowercase hex SHA-256 digest of `token`.
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reset_token_shape() {
        let token = generate_reset_token().unwrap();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_reset_token_is_random() {
        assert_ne!(generate_reset_token().unwrap(), generate_reset_token().unwrap());
    }

    #[test]
    fn test_hash_reset_token_is_stable() {
        let hash = hash_reset_token("token");
        assert_eq!(hash, hash_reset_token("token"));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, hash_reset_token("other"));
    }

    #[test]
    fn test_hash_reset_token_known_value() {
        assert_eq!(
            hash_reset_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
