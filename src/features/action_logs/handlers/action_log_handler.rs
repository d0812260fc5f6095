use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::action_logs::dtos::LogActionResponseDto;
use crate::features::action_logs::services::ActionLogService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::filter::FilterQuery;
use crate::shared::types::{ApiResponse, Meta};

/// List audit entries
///
/// Accepts the generic filter parameters plus `action`, `table_affectee`, `user_id` and
/// `adresse_ip` column filters.
#[utoipa::path(
    get,
    path = "/api/log-actions",
    params(FilterQuery),
    responses(
        (status = 200, description = "Audit entries", body = ApiResponse<Vec<LogActionResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "log-actions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_action_logs(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ActionLogService>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<LogActionResponseDto>>>> {
    let (items, total) = service.list(&query).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/log-actions/{id}",
    params(
        ("id" = i64, Path, description = "Audit entry ID")
    ),
    responses(
        (status = 200, description = "Audit entry", body = ApiResponse<LogActionResponseDto>),
        (status = 404, description = "Not found")
    ),
    tag = "log-actions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_action_log(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ActionLogService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<LogActionResponseDto>>> {
    let entry = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(entry), None, None)))
}
