use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientIp};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::share_links::dtos::{
    AccessCodeQuery, CreateShareLinkDto, ShareLinkCreatedDto, SharedDocumentInfoDto,
};
use crate::features::share_links::services::ShareLinkService;
use crate::shared::file_response::FileResponse;
use crate::shared::types::ApiResponse;

pub const ACCESS_CODE_HEADER: &str = "x-access-code";

/// Code presented with a link request: `access_code` query parameter, else `X-Access-Code`
pub fn presented_code(query: AccessCodeQuery, headers: &HeaderMap) -> Option<String> {
    let non_blank = |code: &str| {
        let code = code.trim();
        (!code.is_empty()).then(|| code.to_string())
    };
    query.access_code.as_deref().and_then(non_blank).or_else(|| {
        headers
            .get(ACCESS_CODE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(non_blank)
    })
}

/// Create a share link for a document (owner only)
#[utoipa::path(
    post,
    path = "/api/documents/{uuid}/share-link",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    request_body = CreateShareLinkDto,
    responses(
        (status = 201, description = "Share link created", body = ApiResponse<ShareLinkCreatedDto>),
        (status = 403, description = "Only the owner can create links"),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "share-links",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_share_link(
    user: AuthenticatedUser,
    State(service): State<Arc<ShareLinkService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
    AppJson(dto): AppJson<CreateShareLinkDto>,
) -> Result<(StatusCode, Json<ApiResponse<ShareLinkCreatedDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = service.create(uuid, &user, dto, &ip).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(created),
            Some("Share link created".to_string()),
            None,
        )),
    ))
}

/// Describe the document behind a share link
///
/// Public. Gates, in order: unknown link (404), expired (403), login required (401),
/// too many wrong codes (429), missing or wrong code (403).
#[utoipa::path(
    get,
    path = "/api/shared-documents/{token}/info",
    params(
        ("token" = String, Path, description = "Share link token"),
        AccessCodeQuery,
        ("X-Access-Code" = Option<String>, Header, description = "Access code, alternative to the query parameter")
    ),
    responses(
        (status = 200, description = "Document summary", body = ApiResponse<SharedDocumentInfoDto>),
        (status = 401, description = "Login required"),
        (status = 403, description = "Link expired, or access code missing or wrong"),
        (status = 404, description = "Unknown link"),
        (status = 429, description = "Link locked after repeated wrong codes")
    ),
    tag = "share-links"
)]
pub async fn shared_document_info(
    State(service): State<Arc<ShareLinkService>>,
    user: Option<AuthenticatedUser>,
    Path(token): Path<String>,
    Query(query): Query<AccessCodeQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<SharedDocumentInfoDto>>> {
    let code = presented_code(query, &headers);
    let info = service
        .info(&token, user.as_ref(), code.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(Some(info), None, None)))
}

/// Download the document behind a share link
///
/// Same gates as the info endpoint.
#[utoipa::path(
    get,
    path = "/api/shared-documents/{token}",
    params(
        ("token" = String, Path, description = "Share link token"),
        AccessCodeQuery,
        ("X-Access-Code" = Option<String>, Header, description = "Access code, alternative to the query parameter")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 401, description = "Login required"),
        (status = 403, description = "Link expired, or access code missing or wrong"),
        (status = 404, description = "Unknown link or missing file"),
        (status = 429, description = "Link locked after repeated wrong codes")
    ),
    tag = "share-links"
)]
pub async fn access_shared_document(
    State(service): State<Arc<ShareLinkService>>,
    user: Option<AuthenticatedUser>,
    ip: ClientIp,
    Path(token): Path<String>,
    Query(query): Query<AccessCodeQuery>,
    headers: HeaderMap,
) -> Result<FileResponse> {
    let code = presented_code(query, &headers);
    service
        .file(&token, user.as_ref(), code.as_deref(), &ip)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_presented_code_prefers_query() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CODE_HEADER, HeaderValue::from_static("222222"));

        let query = AccessCodeQuery {
            access_code: Some("111111".to_string()),
        };
        assert_eq!(presented_code(query, &headers).as_deref(), Some("111111"));
        assert_eq!(
            presented_code(AccessCodeQuery::default(), &headers).as_deref(),
            Some("222222")
        );
    }

    #[test]
    fn test_presented_code_ignores_blank_values() {
        let query = AccessCodeQuery {
            access_code: Some("   ".to_string()),
        };
        assert_eq!(presented_code(query, &HeaderMap::new()), None);
        assert_eq!(presented_code(AccessCodeQuery::default(), &HeaderMap::new()), None);
    }

    #[test]
    fn test_blank_query_code_falls_back_to_header() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CODE_HEADER, HeaderValue::from_static(" 222222 "));

        let query = AccessCodeQuery {
            access_code: Some(String::new()),
        };
        assert_eq!(presented_code(query, &headers).as_deref(), Some("222222"));
    }
}
