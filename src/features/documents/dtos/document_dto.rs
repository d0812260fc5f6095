use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::documents::models::DocumentWithRelations;
use crate::shared::constants::RECENT_DEFAULT_LIMIT;

/// Response DTO for a document
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponseDto {
    pub uuid: Uuid,
    pub nom: String,
    /// Mime type
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes
    pub taille: i64,
    pub description: Option<String>,
    pub user_id: i64,
    pub owner_name: Option<String>,
    pub service_id: Option<i64>,
    pub service_nom: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<DocumentWithRelations> for DocumentResponseDto {
    fn from(row: DocumentWithRelations) -> Self {
        let d = row.document;
        Self {
            uuid: d.uuid,
            nom: d.nom,
            mime_type: d.mime_type,
            taille: d.taille,
            description: d.description,
            user_id: d.user_id,
            owner_name: row.owner_name,
            service_id: d.service_id,
            service_nom: row.service_nom,
            created_at: d.created_at,
            updated_at: d.updated_at,
            deleted_at: d.deleted_at,
        }
    }
}

/// Multipart form of `POST /api/documents` (documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentForm {
    /// The file, at most 10 MB
    #[schema(value_type = String, format = Binary)]
    pub fichier: Vec<u8>,
    pub service_id: Option<i64>,
    /// Up to 1000 characters
    pub description: Option<String>,
}

/// Owner update of document metadata.
///
/// Absent fields are left unchanged. An explicit `null` clears `description` and `service_id`.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateDocumentDto {
    #[validate(length(min = 1, max = 255, message = "Nom must be 1-255 characters"))]
    pub nom: Option<String>,

    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i64>)]
    pub service_id: Option<Option<i64>>,
}

/// Wraps any value that is present in the payload, `null` included, in `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrashResponseDto {
    pub uuid: Uuid,
    pub trashed: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TrashQuery {
    /// Matched against name and description
    pub search_by_keyword: Option<String>,
    /// Rows per page (default 10, max 100)
    pub rows: Option<i64>,
    /// Page number (1-indexed)
    pub page: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendDocumentEmailDto {
    #[validate(email(message = "Invalid recipient email"))]
    pub recipient_email: String,

    #[validate(length(min = 1, max = 255, message = "Subject must be 1-255 characters"))]
    pub subject: String,

    #[validate(length(min = 1, max = 10000, message = "Body must be 1-10000 characters"))]
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecentSource {
    /// Uploaded by the caller
    Published,
    /// Shared with the caller
    Received,
}

/// Entry of the recent documents feed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentDocumentDto {
    pub source: RecentSource,
    /// Upload date for published documents, share date for received ones
    pub action_date: DateTime<Utc>,
    pub shared_by: Option<String>,
    pub permission_level: Option<String>,
    pub document: DocumentResponseDto,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RecentQuery {
    /// Number of entries (default 10, max 100)
    #[serde(default = "default_recent_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
}

fn default_recent_limit() -> i64 {
    RECENT_DEFAULT_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_validation() {
        let ok = UpdateDocumentDto {
            nom: Some("rapport.pdf".to_string()),
            description: None,
            service_id: None,
        };
        assert!(ok.validate().is_ok());

        let too_long = UpdateDocumentDto {
            nom: Some("x".repeat(256)),
            description: None,
            service_id: None,
        };
        assert!(too_long.validate().is_err());

        let empty = UpdateDocumentDto {
            nom: Some(String::new()),
            description: Some(Some("d".repeat(1001))),
            service_id: None,
        };
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nom"));
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let absent: UpdateDocumentDto = serde_json::from_str(r#"{"nom": "a.pdf"}"#).unwrap();
        assert_eq!(absent.description, None);
        assert_eq!(absent.service_id, None);

        let cleared: UpdateDocumentDto =
            serde_json::from_str(r#"{"description": null, "service_id": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert_eq!(cleared.service_id, Some(None));

        let set: UpdateDocumentDto =
            serde_json::from_str(r#"{"description": "Bilan", "service_id": 4}"#).unwrap();
        assert_eq!(set.description, Some(Some("Bilan".to_string())));
        assert_eq!(set.service_id, Some(Some(4)));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_send_email_validation() {
        let dto = SendDocumentEmailDto {
            recipient_email: "bad".to_string(),
            subject: "s".repeat(256),
            body: "Bonjour".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("recipient_email"));
        assert!(errors.field_errors().contains_key("subject"));
    }

    #[test]
    fn test_recent_source_serialization() {
        assert_eq!(
            serde_json::to_value(RecentSource::Published).unwrap(),
            "published"
        );
        assert_eq!(
            serde_json::to_value(RecentSource::Received).unwrap(),
            "received"
        );
    }
}
