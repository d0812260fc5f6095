use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;

use crate::core::database::{is_foreign_key_violation, is_unique_violation};
use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientIp;
use crate::features::action_logs::{ActionLogger, AuditAction, AuditEntry};
use crate::features::auth::dtos::{AuthResponseDto, LoginRequestDto, RegisterRequestDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::credentials::{
    hash_password, random_alphanumeric, verify_password,
};
use crate::features::auth::services::token_service::{check_account_status, TokenService};
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::services::{fetch_user_with_service, find_user_by_email};
use crate::modules::mail::Mailer;
use crate::shared::constants::{GENERATED_PASSWORD_LENGTH, ROLE_ADMIN, ROLE_USER, STATUS_ACTIVE};

const TOKEN_NAME: &str = "auth_token";

/// Service for authentication operations (register, login, logout)
pub struct AuthService {
    pool: PgPool,
    tokens: Arc<TokenService>,
    mailer: Arc<Mailer>,
    audit: Arc<ActionLogger>,
    bcrypt_cost: u32,
    frontend_url: String,
}

impl AuthService {
    pub fn new(
        pool: PgPool,
        tokens: Arc<TokenService>,
        mailer: Arc<Mailer>,
        audit: Arc<ActionLogger>,
        bcrypt_cost: u32,
        frontend_url: String,
    ) -> Self {
        Self {
            pool,
            tokens,
            mailer,
            audit,
            bcrypt_cost,
            frontend_url,
        }
    }

    /// Create an account with a generated password and mail the credentials.
    ///
    /// The insert is rolled back when the mail cannot be sent.
    pub async fn register(&self, dto: RegisterRequestDto, ip: ClientIp) -> Result<UserResponseDto> {
        let email = dto.email.trim().to_lowercase();
        let password = random_alphanumeric(GENERATED_PASSWORD_LENGTH);
        let hash = hash_password(password.clone(), self.bcrypt_cost).await?;
        let name = format!("user{}", Utc::now().format("%Y%m%d%H%M%S"));

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, nom, prenom, email, password, telephone, role, statut, service_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&name)
        .bind(&dto.nom)
        .bind(&dto.prenom)
        .bind(&email)
        .bind(&hash)
        .bind(&dto.telephone)
        .bind(ROLE_USER)
        .bind(STATUS_ACTIVE)
        .bind(dto.service_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already registered".to_string())
            } else if is_foreign_key_violation(&e) {
                AppError::Validation("service_id does not exist".to_string())
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::Database(e)
            }
        })?;

        self.mailer
            .send_generated_password(&email, &dto.nom, &dto.prenom, &password, &self.frontend_url)
            .await?;

        let user = fetch_user_with_service(&mut *tx, user_id).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit registration: {:?}", e);
            AppError::Database(e)
        })?;

        let user: UserResponseDto = user.into();
        self.audit
            .record(
                AuditEntry::new(AuditAction::Created, "users")
                    .by(user.id)
                    .with_new(&user)
                    .from_ip(&ip),
            )
            .await;

        Ok(user)
    }

    pub async fn login(&self, dto: LoginRequestDto, ip: ClientIp) -> Result<AuthResponseDto> {
        let user = find_user_by_email(&self.pool, &dto.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify_password(dto.password, user.user.password.clone()).await? {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        check_account_status(&user.user.statut)?;

        let token = self.tokens.issue(&self.pool, user.user.id, TOKEN_NAME).await?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::Login, "users")
                    .by(user.user.id)
                    .from_ip(&ip),
            )
            .await;

        Ok(AuthResponseDto {
            token: token.plain,
            token_type: "Bearer".to_string(),
            expires_at: token.expires_at,
            user: user.into(),
        })
    }

    /// Revoke the token the request was made with
    pub async fn logout(&self, user: &AuthenticatedUser, ip: ClientIp) -> Result<()> {
        self.tokens.revoke(user.token_id).await?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::Logout, "users")
                    .by(user.id)
                    .from_ip(&ip),
            )
            .await;

        Ok(())
    }

    pub async fn get_current_user(&self, user: &AuthenticatedUser) -> Result<UserResponseDto> {
        Ok(fetch_user_with_service(&self.pool, user.id).await?.into())
    }

    /// Create the configured administrator unless an account with that email exists
    pub async fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email.trim())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to look up bootstrap admin: {:?}", e);
                    AppError::Database(e)
                })?;

        if exists {
            return Ok(false);
        }

        let hash = hash_password(password.to_string(), self.bcrypt_cost).await?;
        sqlx::query(
            r#"
            INSERT INTO users (name, email, password, role, statut)
            VALUES ('admin', $1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(email.trim().to_lowercase())
        .bind(hash)
        .bind(ROLE_ADMIN)
        .bind(STATUS_ACTIVE)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create bootstrap admin: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(true)
    }
}
