use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for notifications
#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: i64,
    /// Recipient
    pub user_id: i64,
    pub sender_id: Option<i64>,
    pub document_id: Option<i64>,
    #[sqlx(rename = "type")]
    pub notification_type: String,
    pub message: String,
    pub data: Option<JsonValue>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationWithContext {
    #[sqlx(flatten)]
    pub notification: Notification,
    pub sender_name: Option<String>,
    pub document_uuid: Option<Uuid>,
    pub document_nom: Option<String>,
}

/// `n` is the notifications alias
pub const NOTIFICATION_SELECT: &str = r#"
    SELECT n.id, n.user_id, n.sender_id, n.document_id, n.type, n.message, n.data, n.read_at,
           n.created_at, s.name AS sender_name, d.uuid AS document_uuid, d.nom AS document_nom
    FROM notifications n
    LEFT JOIN users s ON s.id = n.sender_id
    LEFT JOIN documents d ON d.id = n.document_id
"#;
