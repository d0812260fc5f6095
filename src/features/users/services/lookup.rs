use sqlx::PgExecutor;

use crate::core::error::{AppError, Result};
use crate::features::users::models::{UserWithService, USER_WITH_SERVICE_SELECT};

/// Load a user with its service name; 404 when the id is unknown
pub async fn fetch_user_with_service<'e, E>(executor: E, user_id: i64) -> Result<UserWithService>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, UserWithService>(&format!("{} WHERE u.id = $1", USER_WITH_SERVICE_SELECT))
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user {}: {:?}", user_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

/// Load an account by email, case-insensitively
pub async fn find_user_by_email<'e, E>(executor: E, email: &str) -> Result<Option<UserWithService>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, UserWithService>(&format!(
        "{} WHERE LOWER(u.email) = LOWER($1)",
        USER_WITH_SERVICE_SELECT
    ))
    .bind(email.trim())
    .fetch_optional(executor)
    .await
    .map_err(|e| {
        tracing::error!("Failed to look up user by email: {:?}", e);
        AppError::Database(e)
    })
}
