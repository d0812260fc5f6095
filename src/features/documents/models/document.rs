use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for documents
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: i64,
    pub uuid: Uuid,
    pub nom: String,
    /// Storage key of the file
    pub chemin: String,
    /// Mime type
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes
    pub taille: i64,
    pub description: Option<String>,
    pub user_id: i64,
    pub service_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

/// Document joined with its service and owner names
#[derive(Debug, Clone, FromRow)]
pub struct DocumentWithRelations {
    #[sqlx(flatten)]
    pub document: Document,
    pub service_nom: Option<String>,
    pub owner_name: Option<String>,
}

/// `SELECT` producing [`DocumentWithRelations`]; `d` is the documents alias
pub const DOCUMENT_SELECT: &str = r#"
    SELECT d.id, d.uuid, d.nom, d.chemin, d.type, d.taille, d.description, d.user_id,
           d.service_id, d.created_at, d.updated_at, d.deleted_at,
           s.nom AS service_nom, o.name AS owner_name
    FROM documents d
    LEFT JOIN services s ON s.id = d.service_id
    LEFT JOIN users o ON o.id = d.user_id
"#;
