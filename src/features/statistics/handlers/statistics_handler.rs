use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::auth::guards::RequireAdmin;
use crate::features::statistics::dtos::{
    ActiveUsersDto, ChartDto, FlowGraphDto, GlobalStatsDto, RecentActionsDto,
    RecentActionsQuery, SharingStatsDto, StorageBreakdownDto,
};
use crate::features::statistics::services::StatisticsService;
use crate::shared::types::ApiResponse;

/// Totals of users, documents and shares
#[utoipa::path(
    get,
    path = "/api/statistiques/globales",
    responses(
        (status = 200, description = "Totals of users, documents and shares", body = ApiResponse<GlobalStatsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "statistics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn global_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatisticsService>>,
) -> Result<Json<ApiResponse<GlobalStatsDto>>> {
    let data = service.global().await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Documents created and shared per month, last six months
#[utoipa::path(
    get,
    path = "/api/statistiques/activite-documents",
    responses(
        (status = 200, description = "Documents created and shared per month, last six months", body = ApiResponse<ChartDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "statistics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn document_activity(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatisticsService>>,
) -> Result<Json<ApiResponse<ChartDto>>> {
    let data = service.document_activity().await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/statistiques/repartition-stockage",
    responses(
        (status = 200, description = "Stored bytes per file family", body = ApiResponse<StorageBreakdownDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "statistics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn storage_breakdown(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatisticsService>>,
) -> Result<Json<ApiResponse<StorageBreakdownDto>>> {
    let data = service.storage_breakdown().await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Distinct active users per month, last six months
#[utoipa::path(
    get,
    path = "/api/statistiques/activite-utilisateurs",
    responses(
        (status = 200, description = "Distinct active users per month, last six months", body = ApiResponse<ChartDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "statistics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn user_activity(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatisticsService>>,
) -> Result<Json<ApiResponse<ChartDto>>> {
    let data = service.user_activity().await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Audit entries per action over a period
#[utoipa::path(
    get,
    path = "/api/statistiques/actions-recentes",
    params(RecentActionsQuery),
    responses(
        (status = 200, description = "Audit entries per action over a period", body = ApiResponse<RecentActionsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "statistics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn recent_actions(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatisticsService>>,
    Query(query): Query<RecentActionsQuery>,
) -> Result<Json<ApiResponse<RecentActionsDto>>> {
    let data = service.recent_actions(query.period.unwrap_or_default()).await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/statistiques/actions-utilisateurs",
    responses(
        (status = 200, description = "Audit entries per action and month, last six months", body = ApiResponse<ChartDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "statistics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn user_actions_chart(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatisticsService>>,
) -> Result<Json<ApiResponse<ChartDto>>> {
    let data = service.user_actions_chart().await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Share history and per-user / per-service totals
#[utoipa::path(
    get,
    path = "/api/statistiques/partages-documents",
    responses(
        (status = 200, description = "Share history and per-user / per-service totals", body = ApiResponse<SharingStatsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "statistics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn sharing_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatisticsService>>,
) -> Result<Json<ApiResponse<SharingStatsDto>>> {
    let data = service.sharing().await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Service to service share graph
#[utoipa::path(
    get,
    path = "/api/statistiques/flux-documents",
    responses(
        (status = 200, description = "Service to service share graph", body = ApiResponse<FlowGraphDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "statistics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn document_flow(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatisticsService>>,
) -> Result<Json<ApiResponse<FlowGraphDto>>> {
    let data = service.document_flow().await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/statistiques/utilisateurs-actifs",
    responses(
        (status = 200, description = "Users online now and the latest shares", body = ApiResponse<ActiveUsersDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "statistics",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn active_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatisticsService>>,
) -> Result<Json<ApiResponse<ActiveUsersDto>>> {
    let data = service.active_users().await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}
