//! Password hashing and random secret generation.
//!
//! bcrypt is CPU bound, so hashing and verification run on the blocking pool.

use rand::{distributions::Alphanumeric, Rng};

use crate::core::error::{AppError, Result};

pub async fn hash_password(plain: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Malformed stored hashes count as a mismatch
pub async fn verify_password(plain: String, hash: String) -> Result<bool> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?;

    Ok(verified.unwrap_or_else(|e| {
        tracing::warn!("Stored password hash could not be verified: {}", e);
        false
    }))
}

/// Random `[A-Za-z0-9]` string, used for passwords, API tokens and share link tokens
pub fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random digits, used for share link access codes
pub fn random_digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::ACCESS_CODE_REGEX;

    #[test]
    fn test_random_alphanumeric() {
        let token = random_alphanumeric(32);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, random_alphanumeric(32));
    }

    #[test]
    fn test_random_digits_match_access_code_format() {
        for _ in 0..50 {
            assert!(ACCESS_CODE_REGEX.is_match(&random_digits(6)));
        }
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("s3cret-pass".to_string(), 4).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("s3cret-pass".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_against_garbage_hash_is_false() {
        assert!(!verify_password("x".to_string(), "not-a-hash".to_string())
            .await
            .unwrap());
    }
}
