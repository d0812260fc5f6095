use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::dtos::{NotificationResponseDto, NotificationStatus};
use crate::features::notifications::models::{NotificationWithContext, NOTIFICATION_SELECT};
use crate::shared::constants::NOTIFICATIONS_PAGE_SIZE;
use crate::shared::types::PaginationQuery;

/// Inbox operations. Every query is scoped to the recipient, so another user's notification is
/// indistinguishable from a missing one.
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        status: Option<NotificationStatus>,
        page: i64,
    ) -> Result<(Vec<NotificationResponseDto>, i64)> {
        let page = PaginationQuery::new(page, NOTIFICATIONS_PAGE_SIZE);

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM notifications n");
        push_scope(&mut count, user.id, status);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count notifications: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(NOTIFICATION_SELECT);
        push_scope(&mut select, user.id, status);
        select
            .push(" ORDER BY n.created_at DESC, n.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<NotificationWithContext> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list notifications: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    pub async fn unread_count(&self, user: &AuthenticatedUser) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count unread notifications: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Mark one notification read; already-read notifications keep their first read date
    pub async fn mark_read(&self, id: i64, user: &AuthenticatedUser) -> Result<NotificationResponseDto> {
        let updated = sqlx::query(
            r#"
            UPDATE notifications SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notification read: {:?}", e);
            AppError::Database(e)
        })?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        let row = sqlx::query_as::<_, NotificationWithContext>(&format!(
            "{} WHERE n.id = $1",
            NOTIFICATION_SELECT
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reload notification: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(row.into())
    }

    pub async fn mark_all_read(&self, user: &AuthenticatedUser) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW() WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notifications read: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i64, user: &AuthenticatedUser) -> Result<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete notification: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }
}

fn push_scope(
    builder: &mut QueryBuilder<'_, Postgres>,
    user_id: i64,
    status: Option<NotificationStatus>,
) {
    builder.push(" WHERE n.user_id = ").push_bind(user_id);
    match status {
        Some(NotificationStatus::Unread) => {
            builder.push(" AND n.read_at IS NULL");
        }
        Some(NotificationStatus::Read) => {
            builder.push(" AND n.read_at IS NOT NULL");
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_sql() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notifications n");
        push_scope(&mut builder, 7, Some(NotificationStatus::Unread));
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM notifications n WHERE n.user_id = $1 AND n.read_at IS NULL"
        );

        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notifications n");
        push_scope(&mut builder, 7, None);
        assert!(builder.sql().ends_with("WHERE n.user_id = $1"));
    }
}
