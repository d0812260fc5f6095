use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::access::policy::{
    check_link_gates, resolve_access, AccessGrant, LinkDenial, LinkFacts, PermissionLevel,
    ShareFacts,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::models::{DocumentWithRelations, DOCUMENT_SELECT};
use crate::shared::constants::{SHARE_LINK_LOCK_MINUTES, SHARE_LINK_MAX_CODE_ATTEMPTS};

/// Which lifecycle states an owner lookup accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrashScope {
    Active,
    Any,
}

#[derive(Debug, FromRow)]
struct VisibilityRow {
    #[sqlx(flatten)]
    document: DocumentWithRelations,
    share_permission: Option<String>,
    share_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct LinkRow {
    link_id: i64,
    link_permission: String,
    link_expires_at: Option<DateTime<Utc>>,
    require_login: bool,
    require_code: bool,
    access_code: Option<String>,
    locked_until: Option<DateTime<Utc>>,
    shared_by_name: Option<String>,
    #[sqlx(flatten)]
    document: DocumentWithRelations,
}

/// A share link that passed every gate
#[derive(Debug, Clone)]
pub struct LinkAccess {
    pub link_id: i64,
    pub grant: AccessGrant,
    pub expires_at: Option<DateTime<Utc>>,
    pub shared_by_name: Option<String>,
    pub document: DocumentWithRelations,
}

/// Loads documents on behalf of a user and enforces who may see them
pub struct AccessService {
    pool: PgPool,
}

impl AccessService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A document the user owns. 404 when missing or outside `scope`, 403 for non-owners.
    pub async fn owned_document(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
        scope: TrashScope,
    ) -> Result<DocumentWithRelations> {
        let row = sqlx::query_as::<_, DocumentWithRelations>(&format!(
            "{} WHERE d.uuid = $1",
            DOCUMENT_SELECT
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load document {}: {:?}", uuid, e);
            AppError::Database(e)
        })?;

        let row = row.filter(|r| match scope {
            TrashScope::Active => !r.document.is_trashed(),
            TrashScope::Any => true,
        });

        let row = row.ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;
        if !row.document.is_owned_by(user.id) {
            return Err(AppError::Forbidden(
                "Only the owner can perform this action".to_string(),
            ));
        }
        Ok(row)
    }

    /// A non-trashed document the user owns or holds an active share on
    pub async fn visible_document(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<(DocumentWithRelations, AccessGrant)> {
        let row = sqlx::query_as::<_, VisibilityRow>(&format!(
            r#"
            SELECT visible.*, ds.permission_level AS share_permission,
                   ds.expires_at AS share_expires_at
            FROM ({}) visible
            LEFT JOIN document_shares ds ON ds.document_id = visible.id AND ds.user_id = $2
            WHERE visible.uuid = $1
            "#,
            DOCUMENT_SELECT
        ))
        .bind(uuid)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load document {}: {:?}", uuid, e);
            AppError::Database(e)
        })?
        .filter(|r| !r.document.document.is_trashed())
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        let share = row.share_permission.as_deref().map(|p| ShareFacts {
            permission: PermissionLevel::parse(p),
            expires_at: row.share_expires_at,
        });

        let grant = resolve_access(
            user.id,
            row.document.document.user_id,
            row.document.document.is_trashed(),
            share,
            Utc::now(),
        )
        .ok_or_else(|| AppError::Forbidden("You do not have access to this document".to_string()))?;

        Ok((row.document, grant))
    }

    /// Run the share link gate chain.
    ///
    /// Unknown tokens and links to trashed documents are 404. Wrong codes count towards the
    /// lockout; a correct code clears it.
    pub async fn authorize_link(
        &self,
        token: &str,
        user: Option<&AuthenticatedUser>,
        presented_code: Option<&str>,
    ) -> Result<LinkAccess> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            SELECT l.id AS link_id, l.permission_level AS link_permission,
                   l.expires_at AS link_expires_at, l.require_login, l.require_code,
                   l.access_code, l.locked_until, sb.name AS shared_by_name, doc.*
            FROM share_links l
            JOIN ({}) doc ON doc.id = l.document_id
            LEFT JOIN users sb ON sb.id = l.shared_by
            WHERE l.token = $1 AND doc.deleted_at IS NULL
            "#,
            DOCUMENT_SELECT
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load share link: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Share link not found".to_string()))?;

        let facts = LinkFacts {
            expires_at: row.link_expires_at,
            require_login: row.require_login,
            require_code: row.require_code,
            access_code: row.access_code.as_deref(),
            locked_until: row.locked_until,
        };

        match check_link_gates(&facts, user.is_some(), presented_code, Utc::now()) {
            Ok(()) => {
                if row.require_code {
                    self.reset_code_attempts(row.link_id).await?;
                }
            }
            Err(LinkDenial::CodeIncorrect) => {
                self.record_wrong_code(row.link_id).await?;
                return Err(LinkDenial::CodeIncorrect.into());
            }
            Err(denial) => return Err(denial.into()),
        }

        Ok(LinkAccess {
            link_id: row.link_id,
            grant: AccessGrant::Link(PermissionLevel::parse(&row.link_permission)),
            expires_at: row.link_expires_at,
            shared_by_name: row.shared_by_name,
            document: row.document,
        })
    }

    async fn record_wrong_code(&self, link_id: i64) -> Result<()> {
        let locked_until: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            UPDATE share_links
            SET failed_attempts = CASE WHEN failed_attempts + 1 >= $2 THEN 0
                                       ELSE failed_attempts + 1 END,
                locked_until = CASE WHEN failed_attempts + 1 >= $2
                                    THEN NOW() + make_interval(mins => $3)
                                    ELSE locked_until END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING locked_until
            "#,
        )
        .bind(link_id)
        .bind(SHARE_LINK_MAX_CODE_ATTEMPTS)
        .bind(SHARE_LINK_LOCK_MINUTES as i32)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record wrong access code: {:?}", e);
            AppError::Database(e)
        })?;

        if locked_until.is_some_and(|until| until > Utc::now()) {
            tracing::warn!("Share link {} locked after repeated wrong codes", link_id);
        }
        Ok(())
    }

    async fn reset_code_attempts(&self, link_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE share_links
            SET failed_attempts = 0, locked_until = NULL
            WHERE id = $1 AND (failed_attempts <> 0 OR locked_until IS NOT NULL)
            "#,
        )
        .bind(link_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reset access code attempts: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{database_pool, seed_document, seed_user};

    async fn seed_code_link(pool: &PgPool, owner: &AuthenticatedUser, document: Uuid) -> String {
        let token = Uuid::new_v4().simple().to_string();
        sqlx::query(
            r#"
            INSERT INTO share_links (document_id, token, shared_by, require_code, access_code)
            SELECT id, $2, $3, TRUE, '123456' FROM documents WHERE uuid = $1
            "#,
        )
        .bind(document)
        .bind(&token)
        .bind(owner.id)
        .execute(pool)
        .await
        .unwrap();
        token
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_access_code_lockout_sequence() {
        let pool = database_pool().await;
        let owner = seed_user(&pool).await;
        let document = seed_document(&pool, &owner, "bilan.pdf").await;
        let token = seed_code_link(&pool, &owner, document).await;
        let access = AccessService::new(pool.clone());

        let err = access.authorize_link(&token, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let granted = access
            .authorize_link(&token, None, Some("123456"))
            .await
            .unwrap();
        assert_eq!(granted.document.document.uuid, document);

        for _ in 0..SHARE_LINK_MAX_CODE_ATTEMPTS {
            let err = access
                .authorize_link(&token, None, Some("000000"))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)));
        }

        let err = access
            .authorize_link(&token, None, Some("000000"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimitExceeded(_)));

        let err = access
            .authorize_link(&token, None, Some("123456"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimitExceeded(_)));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_correct_code_clears_wrong_attempts() {
        let pool = database_pool().await;
        let owner = seed_user(&pool).await;
        let document = seed_document(&pool, &owner, "note.pdf").await;
        let token = seed_code_link(&pool, &owner, document).await;
        let access = AccessService::new(pool.clone());

        for _ in 0..SHARE_LINK_MAX_CODE_ATTEMPTS - 1 {
            assert!(access
                .authorize_link(&token, None, Some("000000"))
                .await
                .is_err());
        }
        access
            .authorize_link(&token, None, Some("123456"))
            .await
            .unwrap();

        let attempts: i32 =
            sqlx::query_scalar("SELECT failed_attempts FROM share_links WHERE token = $1")
                .bind(&token)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(attempts, 0);

        let err = access
            .authorize_link(&token, None, Some("000000"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_link_to_trashed_document_is_not_found() {
        let pool = database_pool().await;
        let owner = seed_user(&pool).await;
        let document = seed_document(&pool, &owner, "ancien.pdf").await;
        let token = seed_code_link(&pool, &owner, document).await;
        sqlx::query("UPDATE documents SET deleted_at = NOW() WHERE uuid = $1")
            .bind(document)
            .execute(&pool)
            .await
            .unwrap();

        let err = AccessService::new(pool.clone())
            .authorize_link(&token, None, Some("123456"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
