use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::database::is_foreign_key_violation;
use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientIp;
use crate::features::access::policy::ACTIVE_SHARE_SQL;
use crate::features::access::{AccessService, TrashScope};
use crate::features::action_logs::{ActionLogger, AuditAction, AuditEntry};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::{
    DocumentResponseDto, RecentDocumentDto, RecentSource, SendDocumentEmailDto, TrashQuery,
    TrashResponseDto, UpdateDocumentDto,
};
use crate::features::documents::models::{DocumentWithRelations, DOCUMENT_SELECT};
use crate::modules::mail::{MailAttachment, Mailer};
use crate::modules::storage::SharedStorage;
use crate::shared::constants::{DEFAULT_PAGE_SIZE, DOCUMENTS_PREFIX, MAX_FILE_SIZE, MAX_PAGE_SIZE};
use crate::shared::file_response::{Disposition, FileResponse};
use crate::shared::filter::{like_pattern, push_type_condition, FilterParams, FilterSpec};
use crate::shared::mime::{extension_of, mime_for_extension};
use crate::shared::types::PaginationQuery;

const TABLE: &str = "documents";

/// Longest description accepted on upload
const MAX_DESCRIPTION_LENGTH: usize = 1000;

pub const DOCUMENT_FILTER: FilterSpec = FilterSpec {
    alias: "d",
    columns: &[
        "id",
        "nom",
        "type",
        "taille",
        "service_id",
        "created_at",
        "updated_at",
    ],
    keyword_columns: &["nom", "description"],
    date_column: "created_at",
    default_sort: "created_at",
};

/// A file received from the upload form
#[derive(Debug)]
pub struct NewUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub service_id: Option<i64>,
    pub description: Option<String>,
}

/// Optional narrowing of the recent documents feed
#[derive(Debug, Default, Clone)]
pub struct RecentFilter {
    pub q: Option<String>,
    pub mime_type: Option<String>,
    pub source: Option<RecentSource>,
}

#[derive(Debug, FromRow)]
struct RecentRow {
    #[sqlx(flatten)]
    document: DocumentWithRelations,
    source: String,
    action_date: DateTime<Utc>,
    shared_by: Option<String>,
    permission_level: Option<String>,
}

impl From<RecentRow> for RecentDocumentDto {
    fn from(row: RecentRow) -> Self {
        let source = if row.source == "received" {
            RecentSource::Received
        } else {
            RecentSource::Published
        };
        Self {
            source,
            action_date: row.action_date,
            shared_by: row.shared_by,
            permission_level: row.permission_level,
            document: row.document.into(),
        }
    }
}

/// Document lifecycle: upload, metadata, trash / restore / purge, file delivery
pub struct DocumentService {
    pool: PgPool,
    access: Arc<AccessService>,
    storage: SharedStorage,
    mailer: Arc<Mailer>,
    audit: Arc<ActionLogger>,
}

impl DocumentService {
    pub fn new(
        pool: PgPool,
        access: Arc<AccessService>,
        storage: SharedStorage,
        mailer: Arc<Mailer>,
        audit: Arc<ActionLogger>,
    ) -> Self {
        Self {
            pool,
            access,
            storage,
            mailer,
            audit,
        }
    }

    /// The caller's active documents, generic filter applied
    pub async fn list_mine(
        &self,
        user: &AuthenticatedUser,
        query: &HashMap<String, String>,
    ) -> Result<(Vec<DocumentResponseDto>, i64)> {
        let params = FilterParams::from_query(query, &DOCUMENT_FILTER)?;

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM documents d WHERE d.deleted_at IS NULL AND d.user_id = ");
        count.push_bind(user.id);
        params.push_conditions(&mut count, &DOCUMENT_FILTER);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count documents: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(DOCUMENT_SELECT);
        select
            .push(" WHERE d.deleted_at IS NULL AND d.user_id = ")
            .push_bind(user.id);
        params.push_conditions(&mut select, &DOCUMENT_FILTER);
        params.push_order_and_page(&mut select, &DOCUMENT_FILTER);

        let rows: Vec<DocumentWithRelations> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list documents: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Store the file under `documents/{uuid}.{ext}` and insert its row.
    ///
    /// The stored file is removed again when the insert fails.
    pub async fn upload(
        &self,
        user: &AuthenticatedUser,
        upload: NewUpload,
        ip: &ClientIp,
    ) -> Result<DocumentResponseDto> {
        if upload.data.is_empty() {
            return Err(AppError::Validation("fichier must not be empty".to_string()));
        }
        if upload.data.len() > MAX_FILE_SIZE {
            return Err(AppError::Validation(format!(
                "fichier must not exceed {} MB",
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }
        let description = upload
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
        {
            return Err(AppError::Validation(format!(
                "description must be at most {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }

        let nom = display_name(&upload.filename);
        let extension = extension_of(&nom);
        let mime_type = resolve_mime(upload.content_type.as_deref(), extension.as_deref());
        let uuid = Uuid::new_v4();
        let key = match &extension {
            Some(ext) => format!("{}/{}.{}", DOCUMENTS_PREFIX, uuid, ext),
            None => format!("{}/{}", DOCUMENTS_PREFIX, uuid),
        };
        let taille = upload.data.len() as i64;

        self.storage.put(&key, upload.data, &mime_type).await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO documents (uuid, nom, chemin, type, taille, description, user_id, service_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(uuid)
        .bind(&nom)
        .bind(&key)
        .bind(&mime_type)
        .bind(taille)
        .bind(&description)
        .bind(user.id)
        .bind(upload.service_id)
        .fetch_one(&self.pool)
        .await;

        if let Err(e) = inserted {
            if let Err(cleanup) = self.storage.delete(&key).await {
                tracing::warn!("Failed to remove orphaned file {}: {}", key, cleanup);
            }
            return Err(if is_foreign_key_violation(&e) {
                AppError::Validation("service_id does not exist".to_string())
            } else {
                tracing::error!("Failed to insert document: {:?}", e);
                AppError::Database(e)
            });
        }

        let document: DocumentResponseDto = self
            .access
            .owned_document(uuid, user, TrashScope::Active)
            .await?
            .into();

        self.audit
            .record(
                AuditEntry::new(AuditAction::Created, TABLE)
                    .by(user.id)
                    .with_new(&document)
                    .from_ip(ip),
            )
            .await;

        tracing::info!("User {} uploaded document {} ({} bytes)", user.id, uuid, taille);
        Ok(document)
    }

    /// A document the caller owns or holds an active share on
    pub async fn show(&self, uuid: Uuid, user: &AuthenticatedUser) -> Result<DocumentResponseDto> {
        let (document, _grant) = self.access.visible_document(uuid, user).await?;
        Ok(document.into())
    }

    /// Owner update of name, description and service
    pub async fn update(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
        dto: UpdateDocumentDto,
        ip: &ClientIp,
    ) -> Result<DocumentResponseDto> {
        let current = self
            .access
            .owned_document(uuid, user, TrashScope::Active)
            .await?;
        let before: DocumentResponseDto = current.clone().into();

        sqlx::query(
            r#"
            UPDATE documents
            SET nom = COALESCE($2, nom),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                service_id = CASE WHEN $5 THEN $6 ELSE service_id END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(current.document.id)
        .bind(dto.nom.as_deref().map(str::trim))
        .bind(dto.description.is_some())
        .bind(dto.description.as_ref().and_then(|d| d.as_deref()))
        .bind(dto.service_id.is_some())
        .bind(dto.service_id.flatten())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::Validation("service_id does not exist".to_string())
            } else {
                tracing::error!("Failed to update document: {:?}", e);
                AppError::Database(e)
            }
        })?;

        let after: DocumentResponseDto = self
            .access
            .owned_document(uuid, user, TrashScope::Active)
            .await?
            .into();

        self.audit
            .record(
                AuditEntry::new(AuditAction::Updated, TABLE)
                    .by(user.id)
                    .with_old(&before)
                    .with_new(&after)
                    .from_ip(ip),
            )
            .await;

        Ok(after)
    }

    /// Move an active document to the trash
    pub async fn trash(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<TrashResponseDto> {
        let current = self
            .access
            .owned_document(uuid, user, TrashScope::Active)
            .await?;

        let deleted_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            "UPDATE documents SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 RETURNING deleted_at",
        )
        .bind(current.document.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to trash document: {:?}", e);
            AppError::Database(e)
        })?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::Trashed, TABLE)
                    .by(user.id)
                    .with_old(&json!({ "uuid": uuid, "nom": current.document.nom }))
                    .from_ip(ip),
            )
            .await;

        Ok(TrashResponseDto {
            uuid,
            trashed: true,
            deleted_at,
        })
    }

    /// The caller's trashed documents, most recently trashed first
    pub async fn list_trash(
        &self,
        user: &AuthenticatedUser,
        query: &TrashQuery,
    ) -> Result<(Vec<DocumentResponseDto>, i64)> {
        let page = PaginationQuery::new(
            query.page.unwrap_or(1),
            query.rows.filter(|r| *r > 0).unwrap_or(DEFAULT_PAGE_SIZE),
        );
        let keyword = query
            .search_by_keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(like_pattern);

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM documents d");
        push_trash_filters(&mut count, user.id, keyword.as_deref());
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count trashed documents: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(DOCUMENT_SELECT);
        push_trash_filters(&mut select, user.id, keyword.as_deref());
        select
            .push(" ORDER BY d.deleted_at DESC, d.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items: Vec<DocumentWithRelations> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list trashed documents: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((items.into_iter().map(Into::into).collect(), total))
    }

    /// Bring a trashed document back. 400 when it is not in the trash.
    pub async fn restore(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<DocumentResponseDto> {
        let current = self.access.owned_document(uuid, user, TrashScope::Any).await?;
        if !current.document.is_trashed() {
            return Err(AppError::BadRequest("Document is not in the trash".to_string()));
        }

        sqlx::query("UPDATE documents SET deleted_at = NULL, updated_at = NOW() WHERE id = $1")
            .bind(current.document.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to restore document: {:?}", e);
                AppError::Database(e)
            })?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::Restored, TABLE)
                    .by(user.id)
                    .with_new(&json!({ "uuid": uuid, "nom": current.document.nom }))
                    .from_ip(ip),
            )
            .await;

        let restored = self
            .access
            .owned_document(uuid, user, TrashScope::Active)
            .await?;
        Ok(restored.into())
    }

    /// Delete the row and the stored file for good.
    ///
    /// The row delete is committed only after the file is gone; a missing file counts as gone.
    pub async fn force_delete(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<()> {
        let current = self.access.owned_document(uuid, user, TrashScope::Any).await?;
        let snapshot: DocumentResponseDto = current.clone().into();

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(current.document.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete document row: {:?}", e);
                AppError::Database(e)
            })?;

        // Dropping the transaction on error rolls the delete back
        self.storage.delete(&current.document.chemin).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit document purge: {:?}", e);
            AppError::Database(e)
        })?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::Purged, TABLE)
                    .by(user.id)
                    .with_old(&snapshot)
                    .from_ip(ip),
            )
            .await;

        tracing::info!("User {} purged document {}", user.id, uuid);
        Ok(())
    }

    /// The stored file, inline for preview or as attachment for download
    pub async fn file(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
        disposition: Disposition,
        ip: &ClientIp,
    ) -> Result<FileResponse> {
        let (document, _grant) = self.access.visible_document(uuid, user).await?;
        let data = self.storage.get(&document.document.chemin).await?;

        if disposition == Disposition::Attachment {
            self.audit
                .record(
                    AuditEntry::new(AuditAction::Downloaded, TABLE)
                        .by(user.id)
                        .with_new(&json!({ "uuid": uuid, "nom": document.document.nom }))
                        .from_ip(ip),
                )
                .await;
        }

        Ok(FileResponse {
            filename: document.document.nom,
            content_type: document.document.mime_type,
            data,
            disposition,
        })
    }

    /// Mail the file to any address, as an attachment. Owner only.
    pub async fn send_email(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
        dto: SendDocumentEmailDto,
        ip: &ClientIp,
    ) -> Result<()> {
        let document = self
            .access
            .owned_document(uuid, user, TrashScope::Active)
            .await?
            .document;
        let data = self.storage.get(&document.chemin).await?;

        self.mailer
            .send_document(
                dto.recipient_email.trim(),
                &dto.subject,
                &dto.body,
                &user.name,
                MailAttachment {
                    filename: document.nom.clone(),
                    content_type: document.mime_type.clone(),
                    data,
                },
            )
            .await?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::Emailed, TABLE)
                    .by(user.id)
                    .with_new(&json!({
                        "uuid": uuid,
                        "recipient_email": dto.recipient_email,
                        "subject": dto.subject,
                    }))
                    .from_ip(ip),
            )
            .await;

        Ok(())
    }

    /// Published and received documents merged by action date, newest first
    pub async fn recent(
        &self,
        user: &AuthenticatedUser,
        limit: i64,
        filter: &RecentFilter,
    ) -> Result<Vec<RecentDocumentDto>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"
            SELECT * FROM (
                SELECT doc.*, 'published' AS source, doc.created_at AS action_date,
                       NULL::varchar AS shared_by, NULL::varchar AS permission_level
                FROM ({select}) doc
                WHERE doc.deleted_at IS NULL AND doc.user_id = "#,
            select = DOCUMENT_SELECT
        ));
        builder.push_bind(user.id);
        builder.push(format!(
            r#"
                UNION ALL
                SELECT doc.*, 'received' AS source, ds.created_at AS action_date,
                       sb.name AS shared_by, ds.permission_level
                FROM ({select}) doc
                JOIN document_shares ds ON ds.document_id = doc.id
                LEFT JOIN users sb ON sb.id = ds.shared_by
                WHERE doc.deleted_at IS NULL AND {active} AND ds.user_id = "#,
            select = DOCUMENT_SELECT,
            active = ACTIVE_SHARE_SQL
        ));
        builder.push_bind(user.id);
        builder.push(") recent WHERE TRUE");

        if let Some(source) = filter.source {
            let source = match source {
                RecentSource::Published => "published",
                RecentSource::Received => "received",
            };
            builder.push(" AND recent.source = ").push_bind(source);
        }
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = like_pattern(q);
            builder
                .push(" AND (recent.nom ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR recent.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(mime_type) = filter.mime_type.as_deref() {
            push_type_condition(&mut builder, "recent", mime_type);
        }

        builder
            .push(" ORDER BY recent.action_date DESC, recent.id DESC LIMIT ")
            .push_bind(limit);

        let rows: Vec<RecentRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load recent documents: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

fn push_trash_filters(builder: &mut QueryBuilder<'_, Postgres>, user_id: i64, pattern: Option<&str>) {
    builder
        .push(" WHERE d.deleted_at IS NOT NULL AND d.user_id = ")
        .push_bind(user_id);
    if let Some(pattern) = pattern {
        builder
            .push(" AND (d.nom ILIKE ")
            .push_bind(pattern.to_string())
            .push(" OR d.description ILIKE ")
            .push_bind(pattern.to_string())
            .push(")");
    }
}

/// Client filename reduced to its last path component, at most 255 characters
fn display_name(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();
    let name = if name.is_empty() { "document" } else { name };
    name.chars().take(255).collect()
}

/// Declared content type, or a guess from the extension when the client sent none
fn resolve_mime(declared: Option<&str>, extension: Option<&str>) -> String {
    declared
        .map(str::trim)
        .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
        .map(str::to_string)
        .or_else(|| extension.and_then(mime_for_extension).map(str::to_string))
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::LocalDiskStorage;
    use crate::shared::test_helpers::{database_pool, seed_document, seed_user};

    fn service(pool: &PgPool, storage: SharedStorage) -> DocumentService {
        DocumentService::new(
            pool.clone(),
            Arc::new(AccessService::new(pool.clone())),
            storage,
            Arc::new(Mailer::log_only("DocVault <no-reply@localhost>").unwrap()),
            Arc::new(ActionLogger::new(pool.clone())),
        )
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("rapport.pdf"), "rapport.pdf");
        assert_eq!(display_name("C:\\Users\\awa\\bilan.xlsx"), "bilan.xlsx");
        assert_eq!(display_name("../../etc/passwd"), "passwd");
        assert_eq!(display_name("dossier/"), "document");
        assert_eq!(display_name(&"a".repeat(300)).len(), 255);
    }

    #[test]
    fn test_resolve_mime() {
        assert_eq!(resolve_mime(Some("application/pdf"), Some("pdf")), "application/pdf");
        assert_eq!(
            resolve_mime(Some("application/octet-stream"), Some("png")),
            "image/png"
        );
        assert!(resolve_mime(None, Some("docx")).contains("wordprocessingml"));
        assert_eq!(resolve_mime(None, None), "application/octet-stream");
        assert_eq!(resolve_mime(Some(""), Some("bin")), "application/octet-stream");
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_trash_restore_and_purge_lifecycle() {
        let pool = database_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let storage: SharedStorage =
            Arc::new(LocalDiskStorage::new(dir.path().to_path_buf()).await.unwrap());
        let service = service(&pool, storage.clone());
        let owner = seed_user(&pool).await;
        let ip = ClientIp::default();
        let no_filter = HashMap::new();
        let trash_query = TrashQuery {
            search_by_keyword: None,
            rows: None,
            page: None,
        };

        let uploaded = service
            .upload(
                &owner,
                NewUpload {
                    filename: "budget.pdf".to_string(),
                    content_type: Some("application/pdf".to_string()),
                    data: b"%PDF-1.4".to_vec(),
                    service_id: None,
                    description: None,
                },
                &ip,
            )
            .await
            .unwrap();
        let uuid = uploaded.uuid;
        let key: String = sqlx::query_scalar("SELECT chemin FROM documents WHERE uuid = $1")
            .bind(uuid)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(storage.exists(&key).await.unwrap());

        let listed = |docs: &[DocumentResponseDto]| docs.iter().any(|d| d.uuid == uuid);

        let (mine, _) = service.list_mine(&owner, &no_filter).await.unwrap();
        assert!(listed(&mine));

        let trashed = service.trash(uuid, &owner, &ip).await.unwrap();
        assert!(trashed.trashed);
        let (mine, _) = service.list_mine(&owner, &no_filter).await.unwrap();
        let (trash, _) = service.list_trash(&owner, &trash_query).await.unwrap();
        assert!(!listed(&mine));
        assert!(listed(&trash));

        service.restore(uuid, &owner, &ip).await.unwrap();
        let (mine, _) = service.list_mine(&owner, &no_filter).await.unwrap();
        let (trash, _) = service.list_trash(&owner, &trash_query).await.unwrap();
        assert!(listed(&mine));
        assert!(!listed(&trash));
        assert!(matches!(
            service.restore(uuid, &owner, &ip).await,
            Err(AppError::BadRequest(_))
        ));

        service.trash(uuid, &owner, &ip).await.unwrap();
        service.force_delete(uuid, &owner, &ip).await.unwrap();
        let (trash, _) = service.list_trash(&owner, &trash_query).await.unwrap();
        assert!(!listed(&trash));
        assert!(!storage.exists(&key).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_update_clears_nullable_fields_only_when_null() {
        let pool = database_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let storage: SharedStorage =
            Arc::new(LocalDiskStorage::new(dir.path().to_path_buf()).await.unwrap());
        let service = service(&pool, storage);
        let owner = seed_user(&pool).await;
        let uuid = seed_document(&pool, &owner, "bilan.pdf").await;
        let ip = ClientIp::default();

        let updated = service
            .update(
                uuid,
                &owner,
                serde_json::from_str(r#"{"description": "Bilan annuel"}"#).unwrap(),
                &ip,
            )
            .await
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("Bilan annuel"));

        let renamed = service
            .update(uuid, &owner, serde_json::from_str(r#"{"nom": "bilan-2024.pdf"}"#).unwrap(), &ip)
            .await
            .unwrap();
        assert_eq!(renamed.nom, "bilan-2024.pdf");
        assert_eq!(renamed.description.as_deref(), Some("Bilan annuel"));

        let cleared = service
            .update(uuid, &owner, serde_json::from_str(r#"{"description": null}"#).unwrap(), &ip)
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.nom, "bilan-2024.pdf");
    }
}
