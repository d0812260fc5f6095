use serde_json::Value as JsonValue;
use sqlx::PgExecutor;

use crate::core::error::{AppError, Result};

/// A notification to write, usually inside the transaction of the change it reports
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub sender_id: Option<i64>,
    pub document_id: Option<i64>,
    pub notification_type: &'static str,
    pub message: String,
    pub data: JsonValue,
}

pub async fn notify<'e, E>(executor: E, notification: &NewNotification) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO notifications (user_id, sender_id, document_id, type, message, data)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(notification.user_id)
    .bind(notification.sender_id)
    .bind(notification.document_id)
    .bind(notification.notification_type)
    .bind(&notification.message)
    .bind(&notification.data)
    .execute(executor)
    .await
    .map_err(|e| {
        tracing::error!(
            "Failed to create '{}' notification for user {}: {:?}",
            notification.notification_type,
            notification.user_id,
            e
        );
        AppError::Database(e)
    })?;
    Ok(())
}
