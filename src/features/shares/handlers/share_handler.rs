use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientIp};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::shares::dtos::{
    ShareByServiceDto, ShareByServiceSummaryDto, ShareDocumentDto, ShareResponseDto,
    SharedWithMeDto, SharedWithMeQuery,
};
use crate::features::shares::services::ShareService;
use crate::shared::types::ApiResponse;

/// Share a document with a user
///
/// Sharing again with the same recipient updates the existing share in place.
#[utoipa::path(
    post,
    path = "/api/documents/{uuid}/share",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    request_body = ShareDocumentDto,
    responses(
        (status = 201, description = "Share created", body = ApiResponse<ShareResponseDto>),
        (status = 200, description = "Existing share updated", body = ApiResponse<ShareResponseDto>),
        (status = 400, description = "Cannot share with yourself"),
        (status = 403, description = "Only the owner can share"),
        (status = 404, description = "Document or recipient not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "shares",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn share_document(
    user: AuthenticatedUser,
    State(service): State<Arc<ShareService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
    AppJson(dto): AppJson<ShareDocumentDto>,
) -> Result<(StatusCode, Json<ApiResponse<ShareResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = service.share(uuid, &user, dto, &ip).await?;
    let (status, message) = if outcome.created {
        (StatusCode::CREATED, "Document shared")
    } else {
        (StatusCode::OK, "Share updated")
    };

    Ok((
        status,
        Json(ApiResponse::success(
            Some(outcome.share),
            Some(message.to_string()),
            None,
        )),
    ))
}

/// List the shares of a document (owner only)
#[utoipa::path(
    get,
    path = "/api/documents/{uuid}/shares",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Shares with recipient and sharer", body = ApiResponse<Vec<ShareResponseDto>>),
        (status = 403, description = "Only the owner can list shares"),
        (status = 404, description = "Document not found")
    ),
    tag = "shares",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_document_shares(
    user: AuthenticatedUser,
    State(service): State<Arc<ShareService>>,
    Path(uuid): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ShareResponseDto>>>> {
    let shares = service.list_for_document(uuid, &user).await?;
    Ok(Json(ApiResponse::success(Some(shares), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{uuid}/shares/{share_id}",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID"),
        ("share_id" = i64, Path, description = "Share ID")
    ),
    responses(
        (status = 200, description = "Share removed"),
        (status = 403, description = "Only the owner can remove a share"),
        (status = 404, description = "Share not found")
    ),
    tag = "shares",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_document_share(
    user: AuthenticatedUser,
    State(service): State<Arc<ShareService>>,
    ip: ClientIp,
    Path((uuid, share_id)): Path<(Uuid, i64)>,
) -> Result<Json<ApiResponse<()>>> {
    service.remove(share_id, Some(uuid), &user, &ip).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Share removed".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/shares/{share_id}",
    params(
        ("share_id" = i64, Path, description = "Share ID")
    ),
    responses(
        (status = 200, description = "Share removed"),
        (status = 403, description = "Only the owner can remove a share"),
        (status = 404, description = "Share not found")
    ),
    tag = "shares",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_share(
    user: AuthenticatedUser,
    State(service): State<Arc<ShareService>>,
    ip: ClientIp,
    Path(share_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.remove(share_id, None, &user, &ip).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Share removed".to_string()),
        None,
    )))
}

/// Remove a document from the caller's "shared with me" list
#[utoipa::path(
    delete,
    path = "/api/documents/{uuid}/shared-with-me",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Share removed"),
        (status = 404, description = "Document not found or not shared with the caller")
    ),
    tag = "shares",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn leave_share(
    user: AuthenticatedUser,
    State(service): State<Arc<ShareService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.leave(uuid, &user, &ip).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Document removed from your shares".to_string()),
        None,
    )))
}

/// Documents shared with the caller
#[utoipa::path(
    get,
    path = "/api/documents/shared-with-me",
    params(SharedWithMeQuery),
    responses(
        (status = 200, description = "Documents under an active share", body = ApiResponse<Vec<SharedWithMeDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "shares",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn shared_with_me(
    user: AuthenticatedUser,
    State(service): State<Arc<ShareService>>,
    Query(query): Query<SharedWithMeQuery>,
) -> Result<Json<ApiResponse<Vec<SharedWithMeDto>>>> {
    let documents = service.shared_with_me(&user, &query).await?;
    Ok(Json(ApiResponse::success(Some(documents), None, None)))
}

/// Share a document with every member of a service
///
/// Non-admin users may only target their own service.
#[utoipa::path(
    post,
    path = "/api/documents/{uuid}/share-by-service",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    request_body = ShareByServiceDto,
    responses(
        (status = 200, description = "Share summary", body = ApiResponse<ShareByServiceSummaryDto>),
        (status = 403, description = "Not the owner, or not the caller's service"),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Validation error or unknown service")
    ),
    tag = "shares",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn share_with_service(
    user: AuthenticatedUser,
    State(service): State<Arc<ShareService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
    AppJson(dto): AppJson<ShareByServiceDto>,
) -> Result<Json<ApiResponse<ShareByServiceSummaryDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let summary = service.share_with_service(uuid, &user, dto, &ip).await?;
    Ok(Json(ApiResponse::success(
        Some(summary),
        Some("Document shared with the service".to_string()),
        None,
    )))
}
