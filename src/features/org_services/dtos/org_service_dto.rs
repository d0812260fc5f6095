use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::org_services::models::OrgService;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrgServiceResponseDto {
    pub id: i64,
    pub nom: String,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "1500.00")]
    pub prix: Option<Decimal>,
    pub statut: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrgService> for OrgServiceResponseDto {
    fn from(s: OrgService) -> Self {
        Self {
            id: s.id,
            nom: s.nom,
            description: s.description,
            prix: s.prix,
            statut: s.statut,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrgServiceDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub nom: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_prix"))]
    #[schema(value_type = Option<String>, example = "1500.00")]
    pub prix: Option<Decimal>,

    #[validate(custom(function = "crate::features::users::dtos::validate_statut"))]
    pub statut: Option<String>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrgServiceDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub nom: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_prix"))]
    #[schema(value_type = Option<String>, example = "1500.00")]
    pub prix: Option<Decimal>,

    #[validate(custom(function = "crate::features::users::dtos::validate_statut"))]
    pub statut: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct DestroyGroupDto {
    #[validate(length(min = 1, message = "At least one id is required"))]
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DestroyGroupResponseDto {
    pub deleted: u64,
}

fn validate_prix(value: &Decimal) -> Result<(), validator::ValidationError> {
    if value.is_sign_negative() {
        let mut err = validator::ValidationError::new("prix");
        err.message = Some("prix must not be negative".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_create_validation() {
        let dto = CreateOrgServiceDto {
            nom: "Comptabilité".to_string(),
            description: None,
            prix: Some(Decimal::from_str("1500.00").unwrap()),
            statut: Some("actif".to_string()),
        };
        assert!(dto.validate().is_ok());

        let negative = CreateOrgServiceDto {
            prix: Some(Decimal::from_str("-1").unwrap()),
            ..dto
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_destroy_group_requires_ids() {
        assert!(DestroyGroupDto { ids: vec![] }.validate().is_err());
        assert!(DestroyGroupDto { ids: vec![3, 4] }.validate().is_ok());
    }
}
