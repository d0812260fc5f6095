use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientIp};
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::org_services::dtos::{
    CreateOrgServiceDto, DestroyGroupDto, DestroyGroupResponseDto, OrgServiceResponseDto,
    UpdateOrgServiceDto,
};
use crate::features::org_services::services::OrgServiceService;
use crate::shared::filter::FilterQuery;
use crate::shared::types::{ApiResponse, Meta};

/// List services
///
/// Accepts the generic filter parameters plus `nom`, `prix` and `statut` column filters.
#[utoipa::path(
    get,
    path = "/api/services",
    params(FilterQuery),
    responses(
        (status = 200, description = "Services", body = ApiResponse<Vec<OrgServiceResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "services",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_services(
    _user: AuthenticatedUser,
    State(service): State<Arc<OrgServiceService>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<OrgServiceResponseDto>>>> {
    let (items, total) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/services/{id}",
    params(
        ("id" = i64, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Service", body = ApiResponse<OrgServiceResponseDto>),
        (status = 404, description = "Service not found")
    ),
    tag = "services",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_service(
    _user: AuthenticatedUser,
    State(service): State<Arc<OrgServiceService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrgServiceResponseDto>>> {
    let item = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(item), None, None)))
}

/// The caller's own service
#[utoipa::path(
    get,
    path = "/api/user/service",
    responses(
        (status = 200, description = "Service of the caller", body = ApiResponse<OrgServiceResponseDto>),
        (status = 404, description = "The caller has no service")
    ),
    tag = "services",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_my_service(
    user: AuthenticatedUser,
    State(service): State<Arc<OrgServiceService>>,
) -> Result<Json<ApiResponse<OrgServiceResponseDto>>> {
    let item = service.for_user(&user).await?;
    Ok(Json(ApiResponse::success(Some(item), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/services",
    request_body = CreateOrgServiceDto,
    responses(
        (status = 201, description = "Service created", body = ApiResponse<OrgServiceResponseDto>),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 422, description = "Validation error")
    ),
    tag = "services",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_service(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<OrgServiceService>>,
    ip: ClientIp,
    AppJson(dto): AppJson<CreateOrgServiceDto>,
) -> Result<(StatusCode, Json<ApiResponse<OrgServiceResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let item = service.create(dto, &admin, &ip).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(item),
            Some("Service created".to_string()),
            None,
        )),
    ))
}

/// Update a service (PUT, or POST for form clients)
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    params(
        ("id" = i64, Path, description = "Service ID")
    ),
    request_body = UpdateOrgServiceDto,
    responses(
        (status = 200, description = "Service updated", body = ApiResponse<OrgServiceResponseDto>),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Service not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "services",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_service(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<OrgServiceService>>,
    ip: ClientIp,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateOrgServiceDto>,
) -> Result<Json<ApiResponse<OrgServiceResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let item = service.update(id, dto, &admin, &ip).await?;
    Ok(Json(ApiResponse::success(
        Some(item),
        Some("Service updated".to_string()),
        None,
    )))
}

/// Delete a service; its members and documents are detached from it
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    params(
        ("id" = i64, Path, description = "Service ID")
    ),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Service not found")
    ),
    tag = "services",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_service(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<OrgServiceService>>,
    ip: ClientIp,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete(id, &admin, &ip).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/services/destroy-group",
    request_body = DestroyGroupDto,
    responses(
        (status = 200, description = "Services deleted", body = ApiResponse<DestroyGroupResponseDto>),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 422, description = "Validation error")
    ),
    tag = "services",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn destroy_service_group(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<OrgServiceService>>,
    ip: ClientIp,
    AppJson(dto): AppJson<DestroyGroupDto>,
) -> Result<Json<ApiResponse<DestroyGroupResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let deleted = service.delete_many(&dto.ids, &admin, &ip).await?;
    Ok(Json(ApiResponse::success(
        Some(DestroyGroupResponseDto { deleted }),
        None,
        None,
    )))
}
