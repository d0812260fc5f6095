use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientIp};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::{
    DocumentResponseDto, RecentDocumentDto, RecentQuery, RecentSource, SendDocumentEmailDto,
    TrashQuery, TrashResponseDto, UpdateDocumentDto, UploadDocumentForm,
};
use crate::features::documents::services::{DocumentService, NewUpload, RecentFilter};
use crate::shared::constants::{MAX_FILE_SIZE, RECENT_DEFAULT_LIMIT};
use crate::shared::file_response::{Disposition, FileResponse};
use crate::shared::filter::FilterQuery;
use crate::shared::types::{ApiResponse, Meta};

/// List the caller's documents
///
/// Accepts the generic filter parameters plus `nom`, `type`, `taille` and `service_id` column
/// filters.
#[utoipa::path(
    get,
    path = "/api/documents",
    params(FilterQuery),
    responses(
        (status = 200, description = "Documents owned by the caller", body = ApiResponse<Vec<DocumentResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_documents(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<DocumentResponseDto>>>> {
    let (items, total) = service.list_mine(&user, &query).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Upload a document
///
/// Accepts multipart/form-data with:
/// - `fichier`: the file (required, at most 10 MB)
/// - `service_id`: service the document belongs to (optional)
/// - `description`: free text, at most 1000 characters (optional)
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body(
        content = UploadDocumentForm,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Document uploaded", body = ApiResponse<DocumentResponseDto>),
        (status = 400, description = "Malformed multipart body"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Missing, empty or oversized file")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    ip: ClientIp,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<DocumentResponseDto>>)> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut service_id: Option<i64> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "fichier" => {
                let filename = field.file_name().unwrap_or("document").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, content_type, data.to_vec()));
            }
            "service_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                let text = text.trim();
                if !text.is_empty() {
                    service_id = Some(text.parse::<i64>().map_err(|_| {
                        AppError::Validation("service_id must be an integer".to_string())
                    })?);
                }
            }
            "description" => {
                description = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| AppError::Validation("fichier is required".to_string()))?;

    let document = service
        .upload(
            &user,
            NewUpload {
                filename,
                content_type,
                data,
                service_id,
                description,
            },
            &ip,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(document),
            Some("Document uploaded".to_string()),
            None,
        )),
    ))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation(format!(
            "fichier must not exceed {} MB",
            MAX_FILE_SIZE / 1024 / 1024
        ))
    } else {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    }
}

/// Get a document visible to the caller
#[utoipa::path(
    get,
    path = "/api/documents/{uuid}",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Document", body = ApiResponse<DocumentResponseDto>),
        (status = 403, description = "No access to this document"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(uuid): Path<Uuid>,
) -> Result<Json<ApiResponse<DocumentResponseDto>>> {
    let document = service.show(uuid, &user).await?;
    Ok(Json(ApiResponse::success(Some(document), None, None)))
}

/// Update document metadata (owner only)
#[utoipa::path(
    method(put, post),
    path = "/api/documents/{uuid}",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    request_body = UpdateDocumentDto,
    responses(
        (status = 200, description = "Document updated", body = ApiResponse<DocumentResponseDto>),
        (status = 403, description = "Only the owner can update"),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
    AppJson(dto): AppJson<UpdateDocumentDto>,
) -> Result<Json<ApiResponse<DocumentResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let document = service.update(uuid, &user, dto, &ip).await?;
    Ok(Json(ApiResponse::success(
        Some(document),
        Some("Document updated".to_string()),
        None,
    )))
}

/// Move a document to the trash (owner only)
#[utoipa::path(
    delete,
    path = "/api/documents/{uuid}",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Document trashed", body = ApiResponse<TrashResponseDto>),
        (status = 403, description = "Only the owner can trash"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn trash_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
) -> Result<Json<ApiResponse<TrashResponseDto>>> {
    let trashed = service.trash(uuid, &user, &ip).await?;
    Ok(Json(ApiResponse::success(
        Some(trashed),
        Some("Document moved to trash".to_string()),
        None,
    )))
}

/// List the caller's trashed documents
#[utoipa::path(
    get,
    path = "/api/documents/trash",
    params(TrashQuery),
    responses(
        (status = 200, description = "Trashed documents", body = ApiResponse<Vec<DocumentResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_trash(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Query(query): Query<TrashQuery>,
) -> Result<Json<ApiResponse<Vec<DocumentResponseDto>>>> {
    let (items, total) = service.list_trash(&user, &query).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Restore a trashed document
#[utoipa::path(
    post,
    path = "/api/documents/{uuid}/restore",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Document restored", body = ApiResponse<DocumentResponseDto>),
        (status = 400, description = "Document is not in the trash"),
        (status = 403, description = "Only the owner can restore"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn restore_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
) -> Result<Json<ApiResponse<DocumentResponseDto>>> {
    let document = service.restore(uuid, &user, &ip).await?;
    Ok(Json(ApiResponse::success(
        Some(document),
        Some("Document restored".to_string()),
        None,
    )))
}

/// Permanently delete a document and its file
#[utoipa::path(
    delete,
    path = "/api/documents/{uuid}/force",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Document deleted permanently"),
        (status = 403, description = "Only the owner can delete"),
        (status = 404, description = "Document not found"),
        (status = 500, description = "Stored file could not be removed; nothing was deleted")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn force_delete_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.force_delete(uuid, &user, &ip).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Document permanently deleted".to_string()),
        None,
    )))
}

/// Display the file inline
#[utoipa::path(
    get,
    path = "/api/documents/{uuid}/preview",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "No access to this document"),
        (status = 404, description = "Document or file not found")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn preview_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
) -> Result<FileResponse> {
    service.file(uuid, &user, Disposition::Inline, &ip).await
}

/// Download the file as an attachment
#[utoipa::path(
    get,
    path = "/api/documents/{uuid}/download",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "No access to this document"),
        (status = 404, description = "Document or file not found")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
) -> Result<FileResponse> {
    service.file(uuid, &user, Disposition::Attachment, &ip).await
}

/// Mail the file to an address (owner only)
#[utoipa::path(
    post,
    path = "/api/documents/{uuid}/send-email",
    params(
        ("uuid" = Uuid, Path, description = "Document UUID")
    ),
    request_body = SendDocumentEmailDto,
    responses(
        (status = 200, description = "Mail sent"),
        (status = 403, description = "Only the owner can send the document"),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Mail could not be sent")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn send_document_email(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    ip: ClientIp,
    Path(uuid): Path<Uuid>,
    AppJson(dto): AppJson<SendDocumentEmailDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.send_email(uuid, &user, dto, &ip).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Document sent by email".to_string()),
        None,
    )))
}

/// Recently published and received documents
#[utoipa::path(
    get,
    path = "/api/documents/recent",
    params(RecentQuery),
    responses(
        (status = 200, description = "Recent documents, newest first", body = ApiResponse<Vec<RecentDocumentDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn recent_documents(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ApiResponse<Vec<RecentDocumentDto>>>> {
    let items = service
        .recent(&user, query.limit, &RecentFilter::default())
        .await?;
    Ok(Json(ApiResponse::success(Some(items), None, None)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RecentSearchQuery {
    /// Matched against name and description
    pub q: Option<String>,
    /// Mime type, mime family (`image/`) or extension
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    /// `published` or `received`
    pub source: Option<RecentSource>,
    /// Number of entries (default 10, max 100)
    pub limit: Option<i64>,
}

/// Search within the recent documents feed
#[utoipa::path(
    get,
    path = "/api/documents/recent/search",
    params(RecentSearchQuery),
    responses(
        (status = 200, description = "Matching recent documents", body = ApiResponse<Vec<RecentDocumentDto>>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "documents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn search_recent_documents(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Query(query): Query<RecentSearchQuery>,
) -> Result<Json<ApiResponse<Vec<RecentDocumentDto>>>> {
    let filter = RecentFilter {
        q: query.q,
        mime_type: query.mime_type,
        source: query.source,
    };
    let items = service
        .recent(&user, query.limit.unwrap_or(RECENT_DEFAULT_LIMIT), &filter)
        .await?;
    Ok(Json(ApiResponse::success(Some(items), None, None)))
}
