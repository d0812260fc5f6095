use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::access::policy::is_share_active;
use crate::features::documents::models::DocumentWithRelations;

/// A direct share joined with its document, recipient and sharer
#[derive(Debug, Clone, FromRow)]
pub struct ShareWithUsers {
    pub id: i64,
    pub document_id: i64,
    pub document_uuid: Uuid,
    pub user_id: i64,
    pub recipient_name: String,
    pub recipient_email: String,
    pub shared_by: i64,
    pub shared_by_name: Option<String>,
    pub shared_by_email: Option<String>,
    pub permission_level: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShareWithUsers {
    pub fn is_active(&self) -> bool {
        is_share_active(self.expires_at, Utc::now())
    }
}

/// `ds` is the document_shares alias
pub const SHARE_SELECT: &str = r#"
    SELECT ds.id, ds.document_id, d.uuid AS document_uuid, ds.user_id,
           r.name AS recipient_name, r.email AS recipient_email, ds.shared_by,
           sb.name AS shared_by_name, sb.email AS shared_by_email, ds.permission_level,
           ds.expires_at, ds.created_at, ds.updated_at
    FROM document_shares ds
    JOIN documents d ON d.id = ds.document_id
    JOIN users r ON r.id = ds.user_id
    LEFT JOIN users sb ON sb.id = ds.shared_by
"#;

/// A document shared with the caller, as listed in "shared with me"
#[derive(Debug, Clone, FromRow)]
pub struct SharedWithMeRow {
    #[sqlx(flatten)]
    pub document: DocumentWithRelations,
    pub share_id: i64,
    pub permission_level: String,
    pub share_expires_at: Option<DateTime<Utc>>,
    pub shared_by_id: i64,
    pub shared_by_name: Option<String>,
    pub shared_by_email: Option<String>,
}
