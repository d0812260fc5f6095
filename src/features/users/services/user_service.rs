use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::database::{is_foreign_key_violation, is_unique_violation};
use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientIp;
use crate::features::action_logs::{ActionLogger, AuditAction, AuditEntry};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::credentials::hash_password;
use crate::features::auth::TokenService;
use crate::features::users::dtos::{
    AssignRoleDto, AssignServiceDto, CreateUserDto, ResetPasswordDto, UpdateUserDto,
    UserResponseDto,
};
use crate::features::users::models::{UserWithService, USER_WITH_SERVICE_SELECT};
use crate::features::users::services::fetch_user_with_service;
use crate::shared::constants::{ROLE_ADMIN, ROLE_USER, STATUS_ACTIVE, STATUS_SUSPENDED};
use crate::shared::filter::{FilterParams, FilterSpec};

const TABLE: &str = "users";

pub const USER_FILTER: FilterSpec = FilterSpec {
    alias: "u",
    columns: &[
        "id",
        "name",
        "nom",
        "prenom",
        "email",
        "role",
        "statut",
        "service_id",
        "created_at",
        "updated_at",
    ],
    keyword_columns: &["name", "nom", "prenom", "email", "telephone"],
    date_column: "created_at",
    default_sort: "created_at",
};

/// Account administration, admin only
pub struct UserService {
    pool: PgPool,
    audit: Arc<ActionLogger>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(pool: PgPool, audit: Arc<ActionLogger>, bcrypt_cost: u32) -> Self {
        Self {
            pool,
            audit,
            bcrypt_cost,
        }
    }

    pub async fn list(&self, query: &HashMap<String, String>) -> Result<(Vec<UserResponseDto>, i64)> {
        let params = FilterParams::from_query(query, &USER_FILTER)?;

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users u WHERE TRUE");
        params.push_conditions(&mut count, &USER_FILTER);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(USER_WITH_SERVICE_SELECT);
        select.push(" WHERE TRUE");
        params.push_conditions(&mut select, &USER_FILTER);
        params.push_order_and_page(&mut select, &USER_FILTER);

        let rows: Vec<UserWithService> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, id: i64) -> Result<UserResponseDto> {
        Ok(fetch_user_with_service(&self.pool, id).await?.into())
    }

    pub async fn create(
        &self,
        dto: CreateUserDto,
        admin: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<UserResponseDto> {
        let hash = hash_password(dto.password, self.bcrypt_cost).await?;

        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, nom, prenom, email, password, telephone, role, statut, service_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(dto.name.trim())
        .bind(&dto.nom)
        .bind(&dto.prenom)
        .bind(dto.email.trim().to_lowercase())
        .bind(&hash)
        .bind(&dto.telephone)
        .bind(dto.role.unwrap_or(ROLE_USER))
        .bind(dto.statut.as_deref().unwrap_or(STATUS_ACTIVE))
        .bind(dto.service_id)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        let user = self.get(user_id).await?;
        self.audit
            .record(
                AuditEntry::new(AuditAction::Created, TABLE)
                    .by(admin.id)
                    .with_new(&user)
                    .from_ip(ip),
            )
            .await;

        Ok(user)
    }

    pub async fn update(
        &self,
        id: i64,
        dto: UpdateUserDto,
        admin: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<UserResponseDto> {
        let before = self.get(id).await?;

        sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                nom = COALESCE($3, nom),
                prenom = COALESCE($4, prenom),
                email = COALESCE($5, email),
                telephone = COALESCE($6, telephone),
                role = COALESCE($7, role),
                statut = COALESCE($8, statut),
                service_id = COALESCE($9, service_id),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(&dto.nom)
        .bind(&dto.prenom)
        .bind(dto.email.as_deref().map(|e| e.trim().to_lowercase()))
        .bind(&dto.telephone)
        .bind(dto.role)
        .bind(&dto.statut)
        .bind(dto.service_id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        let after = self.get(id).await?;
        self.audit
            .record(
                AuditEntry::new(AuditAction::Updated, TABLE)
                    .by(admin.id)
                    .with_old(&before)
                    .with_new(&after)
                    .from_ip(ip),
            )
            .await;

        Ok(after)
    }

    /// Suspend an account and drop its tokens
    pub async fn freeze(
        &self,
        id: i64,
        admin: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<UserResponseDto> {
        if id == admin.id {
            return Err(AppError::BadRequest(
                "You cannot freeze your own account".to_string(),
            ));
        }
        let before = self.get(id).await?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;
        set_statut(&mut *tx, id, STATUS_SUSPENDED).await?;
        let revoked = TokenService::revoke_all_for_user(&mut *tx, id).await?;
        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit freeze: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("User {} frozen, {} token(s) revoked", id, revoked);
        let after = self.get(id).await?;
        self.audit
            .record(
                AuditEntry::new(AuditAction::Frozen, TABLE)
                    .by(admin.id)
                    .with_old(&json!({ "id": id, "statut": before.statut }))
                    .with_new(&json!({ "id": id, "statut": after.statut }))
                    .from_ip(ip),
            )
            .await;

        Ok(after)
    }

    /// Reactivate a suspended or inactive account
    pub async fn unfreeze(
        &self,
        id: i64,
        admin: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<UserResponseDto> {
        let before = fetch_user_with_service(&self.pool, id).await?;
        if !before.user.can_unfreeze() {
            return Err(AppError::BadRequest("Account is not frozen".to_string()));
        }

        set_statut(&self.pool, id, STATUS_ACTIVE).await?;

        let after = self.get(id).await?;
        self.audit
            .record(
                AuditEntry::new(AuditAction::Unfrozen, TABLE)
                    .by(admin.id)
                    .with_old(&json!({ "id": id, "statut": before.user.statut }))
                    .with_new(&json!({ "id": id, "statut": after.statut }))
                    .from_ip(ip),
            )
            .await;

        Ok(after)
    }

    /// Replace the password; existing sessions are ended
    pub async fn reset_password(
        &self,
        id: i64,
        dto: ResetPasswordDto,
        admin: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<()> {
        self.get(id).await?;
        let hash = hash_password(dto.password, self.bcrypt_cost).await?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;
        sqlx::query("UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(&hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to reset password of user {}: {:?}", id, e);
                AppError::Database(e)
            })?;
        TokenService::revoke_all_for_user(&mut *tx, id).await?;
        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit password reset: {:?}", e);
            AppError::Database(e)
        })?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::PasswordReset, TABLE)
                    .by(admin.id)
                    .with_new(&json!({ "id": id }))
                    .from_ip(ip),
            )
            .await;

        Ok(())
    }

    pub async fn assign_role(
        &self,
        id: i64,
        dto: AssignRoleDto,
        admin: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<UserResponseDto> {
        if id == admin.id && dto.role != ROLE_ADMIN {
            return Err(AppError::BadRequest(
                "You cannot remove your own admin role".to_string(),
            ));
        }
        let before = self.get(id).await?;

        sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(dto.role)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to assign role to user {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        let after = self.get(id).await?;
        self.audit
            .record(
                AuditEntry::new(AuditAction::RoleAssigned, TABLE)
                    .by(admin.id)
                    .with_old(&json!({ "id": id, "role": before.role }))
                    .with_new(&json!({ "id": id, "role": after.role }))
                    .from_ip(ip),
            )
            .await;

        Ok(after)
    }

    /// Attach the user to a service, or detach with `null`
    pub async fn assign_service(
        &self,
        id: i64,
        dto: AssignServiceDto,
        admin: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<UserResponseDto> {
        let before = self.get(id).await?;

        sqlx::query("UPDATE users SET service_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(dto.service_id)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        let after = self.get(id).await?;
        self.audit
            .record(
                AuditEntry::new(AuditAction::ServiceAssigned, TABLE)
                    .by(admin.id)
                    .with_old(&json!({ "id": id, "service_id": before.service_id }))
                    .with_new(&json!({ "id": id, "service_id": after.service_id }))
                    .from_ip(ip),
            )
            .await;

        Ok(after)
    }
}

async fn set_statut<'e, E>(executor: E, id: i64, statut: &str) -> Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query("UPDATE users SET statut = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(statut)
        .execute(executor)
        .await
        .map_err(|e| {
            tracing::error!("Failed to set statut of user {}: {:?}", id, e);
            AppError::Database(e)
        })?;
    Ok(())
}

fn write_error(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict("Email already registered".to_string())
    } else if is_foreign_key_violation(&e) {
        AppError::Validation("service_id does not exist".to_string())
    } else {
        tracing::error!("Failed to write user: {:?}", e);
        AppError::Database(e)
    }
}
