use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, PgExecutor, PgPool};
use std::time::Duration;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::credentials::random_alphanumeric;
use crate::shared::constants::{STATUS_ACTIVE, STATUS_SUSPENDED};

const TOKEN_LENGTH: usize = 48;

/// A freshly issued bearer token. The plain value is only ever returned here.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub plain: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct TokenOwnerRow {
    token_id: i64,
    expires_at: Option<DateTime<Utc>>,
    id: i64,
    name: String,
    email: String,
    role: i16,
    statut: String,
    service_id: Option<i64>,
}

/// Opaque bearer tokens persisted in `personal_access_tokens` as SHA-256 digests
pub struct TokenService {
    pool: PgPool,
    ttl: Option<Duration>,
}

impl TokenService {
    pub fn new(pool: PgPool, ttl: Option<Duration>) -> Self {
        Self { pool, ttl }
    }

    pub fn hash_token(plain: &str) -> String {
        hex::encode(Sha256::digest(plain.as_bytes()))
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .map(|ttl| now + ttl)
    }

    pub async fn issue<'e, E>(&self, executor: E, user_id: i64, name: &str) -> Result<IssuedToken>
    where
        E: PgExecutor<'e>,
    {
        let plain = random_alphanumeric(TOKEN_LENGTH);
        let expires_at = self.expiry_from(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO personal_access_tokens (user_id, name, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(Self::hash_token(&plain))
        .bind(expires_at)
        .execute(executor)
        .await
        .map_err(|e| {
            tracing::error!("Failed to issue access token: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(IssuedToken { plain, expires_at })
    }

    /// Resolve a plain bearer token to its user and record the use
    pub async fn authenticate(&self, plain: &str) -> Result<AuthenticatedUser> {
        let row = sqlx::query_as::<_, TokenOwnerRow>(
            r#"
            SELECT t.id AS token_id, t.expires_at, u.id, u.name, u.email, u.role, u.statut,
                   u.service_id
            FROM personal_access_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1
            "#,
        )
        .bind(Self::hash_token(plain))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up access token: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        if is_expired(row.expires_at, Utc::now()) {
            return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
        }
        check_account_status(&row.statut)?;

        let touched = sqlx::query("UPDATE personal_access_tokens SET last_used_at = NOW() WHERE id = $1")
            .bind(row.token_id)
            .execute(&self.pool)
            .await;
        if let Err(e) = touched {
            tracing::warn!("Failed to touch access token {}: {:?}", row.token_id, e);
        }

        Ok(AuthenticatedUser {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            service_id: row.service_id,
            token_id: row.token_id,
        })
    }

    pub async fn revoke(&self, token_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM personal_access_tokens WHERE id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to revoke access token: {:?}", e);
                AppError::Database(e)
            })?;
        Ok(())
    }

    /// Drop every token of a user (freeze, password reset)
    pub async fn revoke_all_for_user<'e, E>(executor: E, user_id: i64) -> Result<u64>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM personal_access_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await
            .map_err(|e| {
                tracing::error!("Failed to revoke tokens of user {}: {:?}", user_id, e);
                AppError::Database(e)
            })?;
        Ok(result.rows_affected())
    }
}

fn is_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.is_some_and(|at| at <= now)
}

/// Only `actif` accounts may log in or use a token
pub fn check_account_status(statut: &str) -> Result<()> {
    match statut {
        STATUS_ACTIVE => Ok(()),
        STATUS_SUSPENDED => Err(AppError::Forbidden("Account is suspended".to_string())),
        _ => Err(AppError::Forbidden("Account is inactive".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_hash_token_is_sha256_hex() {
        let digest = TokenService::hash_token("abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        assert!(!is_expired(None, now));
        assert!(!is_expired(Some(now + ChronoDuration::minutes(1)), now));
        assert!(is_expired(Some(now), now));
        assert!(is_expired(Some(now - ChronoDuration::minutes(1)), now));
    }

    #[tokio::test]
    async fn test_expiry_from_ttl() {
        let pool = crate::shared::test_helpers::lazy_pool();
        let now = Utc::now();

        let forever = TokenService::new(pool.clone(), None);
        assert_eq!(forever.expiry_from(now), None);

        let day = TokenService::new(pool, Some(Duration::from_secs(86_400)));
        assert_eq!(day.expiry_from(now), Some(now + ChronoDuration::days(1)));
    }

    #[test]
    fn test_account_status() {
        assert!(check_account_status("actif").is_ok());
        assert!(matches!(
            check_account_status("suspendu"),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_account_status("inactif"),
            Err(AppError::Forbidden(_))
        ));
    }
}
