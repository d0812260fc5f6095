use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Columns the search results can be ordered by
pub const SEARCH_SORT_COLUMNS: &[&str] = &["nom", "created_at", "updated_at", "taille"];

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DocumentSearchQuery {
    /// Keyword matched against name and description
    #[validate(length(max = 255))]
    pub q: Option<String>,

    /// Full mime type (`application/pdf`), mime family (`image/`) or extension (`pdf`)
    #[serde(rename = "type")]
    #[validate(length(max = 255))]
    pub mime_type: Option<String>,

    /// Owner of the document
    pub user_id: Option<i64>,

    pub service_id: Option<i64>,

    /// First creation day, inclusive
    pub date_from: Option<NaiveDate>,

    /// Last creation day, inclusive
    pub date_to: Option<NaiveDate>,

    /// `nom`, `created_at` (default), `updated_at` or `taille`
    #[serde(alias = "sort")]
    #[validate(custom(function = "validate_sort_by"))]
    pub sort_by: Option<String>,

    /// `asc` or `desc` (default)
    #[serde(alias = "order")]
    #[validate(custom(function = "validate_sort_order"))]
    pub sort_order: Option<String>,

    /// 1 to 100, default 15
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<i64>,

    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
}

fn validate_sort_by(value: &str) -> Result<(), validator::ValidationError> {
    if SEARCH_SORT_COLUMNS.contains(&value) {
        return Ok(());
    }
    let mut err = validator::ValidationError::new("sort_by");
    err.message = Some("sort_by must be one of nom, created_at, updated_at, taille".into());
    Err(err)
}

fn validate_sort_order(value: &str) -> Result<(), validator::ValidationError> {
    if value.eq_ignore_ascii_case("asc") || value.eq_ignore_ascii_case("desc") {
        return Ok(());
    }
    let mut err = validator::ValidationError::new("sort_order");
    err.message = Some("sort_order must be 'asc' or 'desc'".into());
    Err(err)
}

/// Mime types of the visible documents grouped under one display category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TypeOptionDto {
    pub category: String,
    pub count: i64,
    pub mime_types: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct PersonOptionDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Visible documents owned by this person
    pub document_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceOptionDto {
    pub id: i64,
    pub nom: String,
    pub description: Option<String>,
    pub is_user_service: bool,
    /// Visible documents tagged with this service
    pub document_count: i64,
    /// Only the caller's own service can be targeted by service-wide actions
    pub accessible: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FilterOptionsDto {
    pub types: Vec<TypeOptionDto>,
    pub people: Vec<PersonOptionDto>,
    pub services: Vec<ServiceOptionDto>,
    pub user_service_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_validation() {
        assert!(DocumentSearchQuery::default().validate().is_ok());

        let query = DocumentSearchQuery {
            sort_by: Some("taille".to_string()),
            sort_order: Some("ASC".to_string()),
            per_page: Some(100),
            ..Default::default()
        };
        assert!(query.validate().is_ok());

        let query = DocumentSearchQuery {
            sort_by: Some("chemin".to_string()),
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = DocumentSearchQuery {
            per_page: Some(0),
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = DocumentSearchQuery {
            sort_order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }
}
