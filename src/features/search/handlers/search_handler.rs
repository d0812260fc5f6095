use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::DocumentResponseDto;
use crate::features::search::dtos::{DocumentSearchQuery, FilterOptionsDto};
use crate::features::search::services::SearchService;
use crate::shared::types::{ApiResponse, Meta};

/// Advanced document search
///
/// Searches the caller's own documents and the documents actively shared with them. Trashed
/// documents never match.
#[utoipa::path(
    get,
    path = "/api/documents/search",
    params(DocumentSearchQuery),
    responses(
        (status = 200, description = "Matching documents", body = ApiResponse<Vec<DocumentResponseDto>>),
        (status = 400, description = "Malformed query parameter"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid sort or page size")
    ),
    tag = "search",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn search_documents(
    user: AuthenticatedUser,
    State(service): State<Arc<SearchService>>,
    Query(query): Query<DocumentSearchQuery>,
) -> Result<Json<ApiResponse<Vec<DocumentResponseDto>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (items, total) = service.search(&user, &query).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/documents/filters/options",
    responses(
        (status = 200, description = "Available types, people and services", body = ApiResponse<FilterOptionsDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "search",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn filter_options(
    user: AuthenticatedUser,
    State(service): State<Arc<SearchService>>,
) -> Result<Json<ApiResponse<FilterOptionsDto>>> {
    let options = service.filter_options(&user).await?;
    Ok(Json(ApiResponse::success(Some(options), None, None)))
}
