use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::documents::dtos::DocumentResponseDto;
use crate::features::shares::models::{ShareWithUsers, SharedWithMeRow};

/// Share a document with one user
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ShareDocumentDto {
    /// Recipient's account email
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// `read` or `edit`
    #[validate(custom(function = "crate::shared::validation::validate_permission_level"))]
    pub permission_level: String,

    /// Must be in the future; the share never expires when absent
    #[validate(custom(function = "crate::shared::validation::validate_future_datetime"))]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Share a document with every member of a service
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ShareByServiceDto {
    pub service_id: i64,

    /// `read` (default) or `edit`
    #[validate(custom(function = "crate::shared::validation::validate_permission_level"))]
    pub permission_level: Option<String>,

    #[validate(custom(function = "crate::shared::validation::validate_future_datetime"))]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShareUserDto {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShareResponseDto {
    pub id: i64,
    pub document_uuid: uuid::Uuid,
    pub recipient: ShareUserDto,
    pub shared_by: ShareUserDto,
    pub permission_level: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShareWithUsers> for ShareResponseDto {
    fn from(row: ShareWithUsers) -> Self {
        Self {
            is_active: row.is_active(),
            id: row.id,
            document_uuid: row.document_uuid,
            recipient: ShareUserDto {
                id: row.user_id,
                name: Some(row.recipient_name),
                email: Some(row.recipient_email),
            },
            shared_by: ShareUserDto {
                id: row.shared_by,
                name: row.shared_by_name,
                email: row.shared_by_email,
            },
            permission_level: row.permission_level,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A document the caller received through an active share
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SharedWithMeDto {
    pub share_id: i64,
    pub permission_level: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub shared_by: ShareUserDto,
    pub document: DocumentResponseDto,
}

impl From<SharedWithMeRow> for SharedWithMeDto {
    fn from(row: SharedWithMeRow) -> Self {
        Self {
            share_id: row.share_id,
            permission_level: row.permission_level,
            expires_at: row.share_expires_at,
            shared_by: ShareUserDto {
                id: row.shared_by_id,
                name: row.shared_by_name,
                email: row.shared_by_email,
            },
            document: row.document.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SharedWithMeQuery {
    /// Matched against document name and description
    pub q: Option<String>,
    /// Matched against the owner's name
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShareByServiceSummaryDto {
    pub service_name: String,
    /// Shares created by this call
    pub created: i64,
    /// Members who already held a share
    pub skipped: i64,
    /// The caller, never shared with
    pub excluded: i64,
    pub total_users_in_service: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_share_validation() {
        let ok = ShareDocumentDto {
            email: "b@x.com".to_string(),
            permission_level: "read".to_string(),
            expires_at: None,
        };
        assert!(ok.validate().is_ok());

        let bad = ShareDocumentDto {
            email: "b@x.com".to_string(),
            permission_level: "owner".to_string(),
            expires_at: Some(Utc::now() - Duration::days(1)),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("permission_level"));
        assert!(errors.field_errors().contains_key("expires_at"));
    }

    #[test]
    fn test_share_by_service_defaults_are_valid() {
        let dto: ShareByServiceDto = serde_json::from_str(r#"{"service_id": 3}"#).unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.permission_level.is_none());
    }
}
