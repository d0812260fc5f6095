use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientIp;
use crate::features::access::{AccessGrant, AccessService, PermissionLevel, TrashScope};
use crate::features::action_logs::{ActionLogger, AuditAction, AuditEntry};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::credentials::{random_alphanumeric, random_digits};
use crate::features::share_links::dtos::{
    CreateShareLinkDto, ShareLinkCreatedDto, ShareLinkDto, SharedDocumentInfoDto,
    SharedDocumentSummaryDto,
};
use crate::modules::storage::SharedStorage;
use crate::shared::constants::{ACCESS_CODE_LENGTH, SHARE_LINK_TOKEN_LENGTH};
use crate::shared::file_response::{Disposition, FileResponse};

const TABLE: &str = "share_links";

/// Capability links: creation by the owner, gated access by anyone holding the token
pub struct ShareLinkService {
    pool: PgPool,
    access: Arc<AccessService>,
    storage: SharedStorage,
    audit: Arc<ActionLogger>,
    frontend_url: String,
}

impl ShareLinkService {
    pub fn new(
        pool: PgPool,
        access: Arc<AccessService>,
        storage: SharedStorage,
        audit: Arc<ActionLogger>,
        frontend_url: String,
    ) -> Self {
        Self {
            pool,
            access,
            storage,
            audit,
            frontend_url,
        }
    }

    pub fn share_url(&self, token: &str) -> String {
        format!("{}/shared/{}", self.frontend_url.trim_end_matches('/'), token)
    }

    /// Create a link for a document the caller owns.
    ///
    /// The access code is returned once, here; it is never listed again.
    pub async fn create(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
        dto: CreateShareLinkDto,
        ip: &ClientIp,
    ) -> Result<ShareLinkCreatedDto> {
        let document = self
            .access
            .owned_document(uuid, user, TrashScope::Active)
            .await?
            .document;

        let require_code = dto.require_code.unwrap_or(false);
        let access_code = require_code.then(|| {
            dto.access_code
                .clone()
                .unwrap_or_else(|| random_digits(ACCESS_CODE_LENGTH))
        });
        let token = random_alphanumeric(SHARE_LINK_TOKEN_LENGTH);
        let permission = PermissionLevel::parse(&dto.permission_level);

        let link = sqlx::query_as::<_, ShareLinkDto>(
            r#"
            WITH inserted AS (
                INSERT INTO share_links
                    (document_id, token, shared_by, permission_level, expires_at,
                     require_code, access_code, require_login)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT l.id, $9::uuid AS document_uuid, l.token, l.permission_level, l.expires_at,
                   l.require_code, l.require_login, l.shared_by, $10::varchar AS shared_by_name,
                   l.created_at
            FROM inserted l
            "#,
        )
        .bind(document.id)
        .bind(&token)
        .bind(user.id)
        .bind(permission.as_str())
        .bind(dto.expires_at)
        .bind(require_code)
        .bind(&access_code)
        .bind(dto.require_login.unwrap_or(false))
        .bind(uuid)
        .bind(&user.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create share link: {:?}", e);
            AppError::Database(e)
        })?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::LinkCreated, TABLE)
                    .by(user.id)
                    .with_new(&link)
                    .from_ip(ip),
            )
            .await;

        tracing::info!(
            "User {} created share link {} for document {} (code: {}, login: {})",
            user.id,
            link.id,
            uuid,
            link.require_code,
            link.require_login
        );

        Ok(ShareLinkCreatedDto {
            share_url: self.share_url(&token),
            token,
            access_code,
            share: link,
        })
    }

    /// Document summary behind a link, once every gate passed
    pub async fn info(
        &self,
        token: &str,
        user: Option<&AuthenticatedUser>,
        code: Option<&str>,
    ) -> Result<SharedDocumentInfoDto> {
        let link = self.access.authorize_link(token, user, code).await?;
        let permission = match link.grant {
            AccessGrant::Link(level) | AccessGrant::Shared(level) => level,
            AccessGrant::Owner => PermissionLevel::Edit,
        };
        let document = link.document.document;

        Ok(SharedDocumentInfoDto {
            document: SharedDocumentSummaryDto {
                uuid: document.uuid,
                nom: document.nom,
                mime_type: document.mime_type,
                taille: document.taille,
            },
            shared_by: link
                .shared_by_name
                .unwrap_or_else(|| "Utilisateur inconnu".to_string()),
            expires_at: link.expires_at,
            permission_level: permission.as_str().to_string(),
        })
    }

    /// The file behind a link, as an attachment
    pub async fn file(
        &self,
        token: &str,
        user: Option<&AuthenticatedUser>,
        code: Option<&str>,
        ip: &ClientIp,
    ) -> Result<FileResponse> {
        let link = self.access.authorize_link(token, user, code).await?;
        let document = link.document.document;
        let data = self.storage.get(&document.chemin).await?;

        let mut entry = AuditEntry::new(AuditAction::LinkAccessed, TABLE)
            .with_new(&json!({ "share_link_id": link.link_id, "document_uuid": document.uuid }))
            .from_ip(ip);
        if let Some(user) = user {
            entry = entry.by(user.id);
        }
        self.audit.record(entry).await;

        Ok(FileResponse {
            filename: document.nom,
            content_type: document.mime_type,
            data,
            disposition: Disposition::Attachment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::LocalDiskStorage;
    use crate::shared::test_helpers::lazy_pool;

    #[tokio::test]
    async fn test_share_url() {
        let dir = tempfile::tempdir().unwrap();
        let pool = lazy_pool();
        let storage: SharedStorage = Arc::new(
            LocalDiskStorage::new(dir.path().to_path_buf())
                .await
                .unwrap(),
        );
        let service = ShareLinkService::new(
            pool.clone(),
            Arc::new(AccessService::new(pool.clone())),
            storage,
            Arc::new(ActionLogger::new(pool)),
            "https://docs.example.com/".to_string(),
        );

        assert_eq!(
            service.share_url("AbC123"),
            "https://docs.example.com/shared/AbC123"
        );
    }
}
