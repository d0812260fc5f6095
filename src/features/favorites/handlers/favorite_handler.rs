use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::favorites::dtos::{AddFavoriteDto, FavoriteResponseDto};
use crate::features::favorites::services::FavoriteService;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/favoris",
    responses(
        (status = 200, description = "Caller's favorites", body = ApiResponse<Vec<FavoriteResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "favorites",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_favorites(
    user: AuthenticatedUser,
    State(service): State<Arc<FavoriteService>>,
) -> Result<Json<ApiResponse<Vec<FavoriteResponseDto>>>> {
    let favorites = service.list(&user).await?;
    let total = favorites.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(favorites),
        None,
        Some(Meta { total }),
    )))
}

/// Add a document to the caller's favorites
#[utoipa::path(
    post,
    path = "/api/favoris",
    request_body = AddFavoriteDto,
    responses(
        (status = 201, description = "Favorite added", body = ApiResponse<FavoriteResponseDto>),
        (status = 403, description = "Document not visible to the caller"),
        (status = 404, description = "Document not found"),
        (status = 409, description = "Already a favorite")
    ),
    tag = "favorites",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_favorite(
    user: AuthenticatedUser,
    State(service): State<Arc<FavoriteService>>,
    AppJson(dto): AppJson<AddFavoriteDto>,
) -> Result<(StatusCode, Json<ApiResponse<FavoriteResponseDto>>)> {
    let favorite = service.add(&user, dto.document_uuid).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(favorite),
            Some("Document added to favorites".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/favoris/{uuid}",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 404, description = "Not a favorite")
    ),
    tag = "favorites",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_favorite(
    user: AuthenticatedUser,
    State(service): State<Arc<FavoriteService>>,
    Path(uuid): Path<Uuid>,
) -> Result<StatusCode> {
    service.remove(&user, uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
