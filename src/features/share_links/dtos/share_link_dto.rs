use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateShareLinkDto {
    /// `read` or `edit`
    #[validate(custom(function = "crate::shared::validation::validate_permission_level"))]
    pub permission_level: String,

    #[validate(custom(function = "crate::shared::validation::validate_future_datetime"))]
    pub expires_at: Option<DateTime<Utc>>,

    /// Protect the link with a 6-digit code
    pub require_code: Option<bool>,

    /// Code to use when `require_code` is set; generated when absent
    #[validate(regex(
        path = "*crate::shared::validation::ACCESS_CODE_REGEX",
        message = "access_code must be exactly 6 digits"
    ))]
    pub access_code: Option<String>,

    /// Only authenticated users may open the link
    pub require_login: Option<bool>,
}

/// A share link as stored, without its access code
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ShareLinkDto {
    pub id: i64,
    pub document_uuid: Uuid,
    pub token: String,
    pub permission_level: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub require_code: bool,
    pub require_login: bool,
    pub shared_by: i64,
    pub shared_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareLinkCreatedDto {
    pub share: ShareLinkDto,
    /// Frontend page opening the link
    pub share_url: String,
    pub token: String,
    /// Only present on code-protected links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharedDocumentSummaryDto {
    pub uuid: Uuid,
    pub nom: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub taille: i64,
}

/// What a link holder may learn before downloading
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharedDocumentInfoDto {
    pub document: SharedDocumentSummaryDto,
    pub shared_by: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub permission_level: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AccessCodeQuery {
    /// Required on code-protected links; `X-Access-Code` header also accepted
    pub access_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(access_code: Option<&str>) -> CreateShareLinkDto {
        CreateShareLinkDto {
            permission_level: "read".to_string(),
            expires_at: None,
            require_code: Some(true),
            access_code: access_code.map(str::to_string),
            require_login: None,
        }
    }

    #[test]
    fn test_access_code_format() {
        assert!(dto(None).validate().is_ok());
        assert!(dto(Some("042917")).validate().is_ok());
        assert!(dto(Some("42917")).validate().is_err());
        assert!(dto(Some("abcdef")).validate().is_err());
    }

    #[test]
    fn test_created_dto_hides_missing_code() {
        let created = ShareLinkCreatedDto {
            share: ShareLinkDto {
                id: 1,
                document_uuid: Uuid::nil(),
                token: "t".repeat(32),
                permission_level: "read".to_string(),
                expires_at: None,
                require_code: false,
                require_login: false,
                shared_by: 2,
                shared_by_name: None,
                created_at: Utc::now(),
            },
            share_url: "http://localhost:3000/shared/t".to_string(),
            token: "t".repeat(32),
            access_code: None,
        };
        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("access_code").is_none());
    }
}
