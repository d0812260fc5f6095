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
use crate::features::users::dtos::{
    AssignRoleDto, AssignServiceDto, CreateUserDto, ResetPasswordDto, UpdateUserDto,
    UserResponseDto,
};
use crate::features::users::services::UserService;
use crate::shared::filter::FilterQuery;
use crate::shared::types::{ApiResponse, Meta};

/// List user accounts
///
/// Accepts the generic filter parameters plus `name`, `nom`, `prenom`, `email`, `role`,
/// `statut` and `service_id` column filters.
#[utoipa::path(
    get,
    path = "/api/users",
    params(FilterQuery),
    responses(
        (status = 200, description = "User accounts", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (items, total) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User account", body = ApiResponse<UserResponseDto>),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponseDto>),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation error")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    ip: ClientIp,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.create(dto, &admin, &ip).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(user),
            Some("User created".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponseDto>),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation error")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    ip: ClientIp,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.update(id, dto, &admin, &ip).await?;
    Ok(Json(ApiResponse::success(
        Some(user),
        Some("User updated".to_string()),
        None,
    )))
}

/// Freeze an account
///
/// Sets the status to `suspendu` and revokes every token of the user. Admins cannot freeze
/// themselves.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User frozen", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Cannot freeze own account"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn freeze_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    ip: ClientIp,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.freeze(id, &admin, &ip).await?;
    Ok(Json(ApiResponse::success(
        Some(user),
        Some("User frozen".to_string()),
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/unfreeze",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User reactivated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Account is not frozen"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unfreeze_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    ip: ClientIp,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.unfreeze(id, &admin, &ip).await?;
    Ok(Json(ApiResponse::success(
        Some(user),
        Some("User reactivated".to_string()),
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/reset-password",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password replaced, sessions revoked"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reset_password(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    ip: ClientIp,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<ResetPasswordDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.reset_password(id, dto, &admin, &ip).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Password reset".to_string()),
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/assign-role",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = AssignRoleDto,
    responses(
        (status = 200, description = "Role assigned", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Cannot demote own account"),
        (status = 422, description = "Validation error")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn assign_role(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    ip: ClientIp,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<AssignRoleDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.assign_role(id, dto, &admin, &ip).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/assign-service",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = AssignServiceDto,
    responses(
        (status = 200, description = "Service assigned", body = ApiResponse<UserResponseDto>),
        (status = 404, description = "User not found"),
        (status = 422, description = "Unknown service")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn assign_service(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    ip: ClientIp,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<AssignServiceDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.assign_service(id, dto, &admin, &ip).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}
