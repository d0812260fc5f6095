use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::dtos::{
    MarkAllReadResponseDto, NotificationQuery, NotificationResponseDto, UnreadCountDto,
};
use crate::features::notifications::services::NotificationService;
use crate::shared::types::{ApiResponse, Meta};

/// List the caller's notifications, newest first (15 per page)
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications", body = ApiResponse<Vec<NotificationResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_notifications(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationResponseDto>>>> {
    let (items, total) = service
        .list(&user, query.status, query.page.unwrap_or(1))
        .await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Number of unread notifications", body = ApiResponse<UnreadCountDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unread_count(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
) -> Result<Json<ApiResponse<UnreadCountDto>>> {
    let count = service.unread_count(&user).await?;
    Ok(Json(ApiResponse::success(
        Some(UnreadCountDto { count }),
        None,
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = i64, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = ApiResponse<NotificationResponseDto>),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_read(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<NotificationResponseDto>>> {
    let notification = service.mark_read(id, &user).await?;
    Ok(Json(ApiResponse::success(Some(notification), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/notifications/mark-all-read",
    responses(
        (status = 200, description = "All notifications marked as read", body = ApiResponse<MarkAllReadResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_all_read(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
) -> Result<Json<ApiResponse<MarkAllReadResponseDto>>> {
    let updated = service.mark_all_read(&user).await?;
    Ok(Json(ApiResponse::success(
        Some(MarkAllReadResponseDto { updated }),
        None,
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    params(
        ("id" = i64, Path, description = "Notification ID")
    ),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_notification(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
