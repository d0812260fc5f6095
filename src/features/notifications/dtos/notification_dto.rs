use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::notifications::models::NotificationWithContext;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponseDto {
    pub id: i64,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub data: Option<JsonValue>,
    pub sender_id: Option<i64>,
    pub sender_name: Option<String>,
    pub document_uuid: Option<Uuid>,
    pub document_nom: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationWithContext> for NotificationResponseDto {
    fn from(row: NotificationWithContext) -> Self {
        let n = row.notification;
        Self {
            id: n.id,
            is_read: n.is_read(),
            notification_type: n.notification_type,
            message: n.message,
            data: n.data,
            sender_id: n.sender_id,
            sender_name: row.sender_name,
            document_uuid: row.document_uuid,
            document_nom: row.document_nom,
            read_at: n.read_at,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Unread,
    Read,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NotificationQuery {
    /// `unread` or `read`; all notifications when absent
    pub status: Option<NotificationStatus>,
    /// Page number (1-indexed, 15 per page)
    pub page: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountDto {
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponseDto {
    pub updated: u64,
}
