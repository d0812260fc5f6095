use std::sync::Arc;

use serde_json::json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientIp;
use crate::features::access::policy::ACTIVE_SHARE_SQL;
use crate::features::access::{AccessService, PermissionLevel, TrashScope};
use crate::features::action_logs::{ActionLogger, AuditAction, AuditEntry};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::models::DOCUMENT_SELECT;
use crate::features::notifications::{notify, NewNotification};
use crate::features::shares::dtos::{
    ShareByServiceDto, ShareByServiceSummaryDto, ShareDocumentDto, ShareResponseDto,
    SharedWithMeDto, SharedWithMeQuery,
};
use crate::features::shares::models::{ShareWithUsers, SharedWithMeRow, SHARE_SELECT};
use crate::features::users::services::find_user_by_email;
use crate::shared::constants::NOTIFICATION_DOCUMENT_SHARED;
use crate::shared::filter::like_pattern;

const TABLE: &str = "document_shares";

/// Outcome of [`ShareService::share`]
#[derive(Debug)]
pub struct ShareOutcome {
    pub share: ShareResponseDto,
    /// False when an existing share for the same recipient was updated
    pub created: bool,
}

#[derive(Debug, FromRow)]
struct UpsertedShare {
    id: i64,
    inserted: bool,
}

#[derive(Debug, FromRow)]
struct ShareOwnership {
    document_id: i64,
    owner_id: i64,
}

/// Direct user-to-user shares
pub struct ShareService {
    pool: PgPool,
    access: Arc<AccessService>,
    audit: Arc<ActionLogger>,
}

impl ShareService {
    pub fn new(pool: PgPool, access: Arc<AccessService>, audit: Arc<ActionLogger>) -> Self {
        Self {
            pool,
            access,
            audit,
        }
    }

    /// Create or update the share of a document with one recipient.
    ///
    /// The upsert and the recipient's notification are written in one transaction.
    pub async fn share(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
        dto: ShareDocumentDto,
        ip: &ClientIp,
    ) -> Result<ShareOutcome> {
        let document = self
            .access
            .owned_document(uuid, user, TrashScope::Active)
            .await?
            .document;

        let recipient = find_user_by_email(&self.pool, &dto.email)
            .await?
            .ok_or_else(|| AppError::NotFound("No user with this email".to_string()))?
            .user;

        if recipient.id == user.id {
            return Err(AppError::BadRequest(
                "You cannot share a document with yourself".to_string(),
            ));
        }

        let permission = PermissionLevel::parse(&dto.permission_level);

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let upserted = sqlx::query_as::<_, UpsertedShare>(
            r#"
            INSERT INTO document_shares (document_id, user_id, shared_by, permission_level, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (document_id, user_id) DO UPDATE
            SET permission_level = EXCLUDED.permission_level,
                expires_at = EXCLUDED.expires_at,
                shared_by = EXCLUDED.shared_by,
                updated_at = NOW()
            RETURNING id, (xmax = 0) AS inserted
            "#,
        )
        .bind(document.id)
        .bind(recipient.id)
        .bind(user.id)
        .bind(permission.as_str())
        .bind(dto.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert share: {:?}", e);
            AppError::Database(e)
        })?;

        let message = if upserted.inserted {
            format!("{} a partagé un document avec vous : {}", user.name, document.nom)
        } else {
            format!("{} a mis à jour le partage du document : {}", user.name, document.nom)
        };

        notify(
            &mut *tx,
            &NewNotification {
                user_id: recipient.id,
                sender_id: Some(user.id),
                document_id: Some(document.id),
                notification_type: NOTIFICATION_DOCUMENT_SHARED,
                message,
                data: json!({
                    "document_uuid": uuid,
                    "share_id": upserted.id,
                    "permission_level": permission.as_str(),
                    "event": if upserted.inserted { "created" } else { "updated" },
                }),
            },
        )
        .await?;

        let share = fetch_share(&mut *tx, upserted.id).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit share: {:?}", e);
            AppError::Database(e)
        })?;

        let share: ShareResponseDto = share.into();
        self.audit
            .record(
                AuditEntry::new(AuditAction::Shared, TABLE)
                    .by(user.id)
                    .with_new(&share)
                    .from_ip(ip),
            )
            .await;

        Ok(ShareOutcome {
            share,
            created: upserted.inserted,
        })
    }

    /// Shares of a document, for its owner
    pub async fn list_for_document(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<ShareResponseDto>> {
        let document = self
            .access
            .owned_document(uuid, user, TrashScope::Any)
            .await?
            .document;

        let rows = sqlx::query_as::<_, ShareWithUsers>(&format!(
            "{} WHERE ds.document_id = $1 ORDER BY ds.created_at DESC, ds.id DESC",
            SHARE_SELECT
        ))
        .bind(document.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list shares: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Owner removal of a share. When `uuid` is given the share must belong to that document.
    pub async fn remove(
        &self,
        share_id: i64,
        uuid: Option<Uuid>,
        user: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<()> {
        let ownership = sqlx::query_as::<_, ShareOwnership>(
            r#"
            SELECT ds.document_id, d.user_id AS owner_id
            FROM document_shares ds
            JOIN documents d ON d.id = ds.document_id
            WHERE ds.id = $1 AND ($2::uuid IS NULL OR d.uuid = $2)
            "#,
        )
        .bind(share_id)
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load share {}: {:?}", share_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Share not found".to_string()))?;

        if ownership.owner_id != user.id {
            return Err(AppError::Forbidden(
                "Only the owner can remove a share".to_string(),
            ));
        }

        sqlx::query("DELETE FROM document_shares WHERE id = $1")
            .bind(share_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete share {}: {:?}", share_id, e);
                AppError::Database(e)
            })?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::Unshared, TABLE)
                    .by(user.id)
                    .with_old(&json!({ "share_id": share_id, "document_id": ownership.document_id }))
                    .from_ip(ip),
            )
            .await;

        Ok(())
    }

    /// Recipient drops a document from their "shared with me" list
    pub async fn leave(&self, uuid: Uuid, user: &AuthenticatedUser, ip: &ClientIp) -> Result<()> {
        let document_id: i64 = sqlx::query_scalar("SELECT id FROM documents WHERE uuid = $1")
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load document {}: {:?}", uuid, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        let result =
            sqlx::query("DELETE FROM document_shares WHERE document_id = $1 AND user_id = $2")
                .bind(document_id)
                .bind(user.id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to leave share: {:?}", e);
                    AppError::Database(e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "This document is not shared with you".to_string(),
            ));
        }

        self.audit
            .record(
                AuditEntry::new(AuditAction::Unshared, TABLE)
                    .by(user.id)
                    .with_old(&json!({ "document_uuid": uuid, "recipient_id": user.id }))
                    .from_ip(ip),
            )
            .await;

        Ok(())
    }

    /// Active shares held by the caller on non-trashed documents, newest first
    pub async fn shared_with_me(
        &self,
        user: &AuthenticatedUser,
        query: &SharedWithMeQuery,
    ) -> Result<Vec<SharedWithMeDto>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"
            SELECT doc.*, ds.id AS share_id, ds.permission_level,
                   ds.expires_at AS share_expires_at, ds.shared_by AS shared_by_id,
                   sb.name AS shared_by_name, sb.email AS shared_by_email
            FROM document_shares ds
            JOIN ({}) doc ON doc.id = ds.document_id
            LEFT JOIN users sb ON sb.id = ds.shared_by
            WHERE doc.deleted_at IS NULL AND {} AND ds.user_id = "#,
            DOCUMENT_SELECT, ACTIVE_SHARE_SQL
        ));
        builder.push_bind(user.id);

        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = like_pattern(q);
            builder
                .push(" AND (doc.nom ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR doc.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(owner) = query
            .owner
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
        {
            builder
                .push(" AND doc.owner_name ILIKE ")
                .push_bind(like_pattern(owner));
        }
        builder.push(" ORDER BY ds.created_at DESC, ds.id DESC");

        let rows: Vec<SharedWithMeRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list shared documents: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Share with every member of a service except the caller.
    ///
    /// Members who already hold a share are skipped and keep their current permission.
    pub async fn share_with_service(
        &self,
        uuid: Uuid,
        user: &AuthenticatedUser,
        dto: ShareByServiceDto,
        ip: &ClientIp,
    ) -> Result<ShareByServiceSummaryDto> {
        let service_name: String = sqlx::query_scalar("SELECT nom FROM services WHERE id = $1")
            .bind(dto.service_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load service {}: {:?}", dto.service_id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::Validation("service_id does not exist".to_string()))?;

        if !user.is_admin() && user.service_id != Some(dto.service_id) {
            return Err(AppError::Forbidden(
                "You can only share documents with your own service".to_string(),
            ));
        }

        let document = self
            .access
            .owned_document(uuid, user, TrashScope::Active)
            .await?
            .document;

        let permission = dto
            .permission_level
            .as_deref()
            .map(PermissionLevel::parse)
            .unwrap_or(PermissionLevel::Read);

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let members: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE service_id = $1 AND id <> $2")
                .bind(dto.service_id)
                .bind(user.id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count service members: {:?}", e);
                    AppError::Database(e)
                })?;

        let recipients: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            INSERT INTO document_shares (document_id, user_id, shared_by, permission_level, expires_at)
            SELECT $1, u.id, $2, $3, $4
            FROM users u
            WHERE u.service_id = $5 AND u.id <> $2
            ON CONFLICT (document_id, user_id) DO NOTHING
            RETURNING id, user_id
            "#,
        )
        .bind(document.id)
        .bind(user.id)
        .bind(permission.as_str())
        .bind(dto.expires_at)
        .bind(dto.service_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to share with service: {:?}", e);
            AppError::Database(e)
        })?;

        for (share_id, recipient_id) in &recipients {
            notify(
                &mut *tx,
                &NewNotification {
                    user_id: *recipient_id,
                    sender_id: Some(user.id),
                    document_id: Some(document.id),
                    notification_type: NOTIFICATION_DOCUMENT_SHARED,
                    message: format!(
                        "{} a partagé un document avec votre service ({}) : {}",
                        user.name, service_name, document.nom
                    ),
                    data: json!({
                        "document_uuid": uuid,
                        "share_id": share_id,
                        "permission_level": permission.as_str(),
                        "event": "created",
                        "service_id": dto.service_id,
                    }),
                },
            )
            .await?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit service share: {:?}", e);
            AppError::Database(e)
        })?;

        let created = recipients.len() as i64;
        let summary = ShareByServiceSummaryDto {
            service_name,
            created,
            skipped: (members - created).max(0),
            excluded: 1,
            total_users_in_service: members + 1,
        };

        self.audit
            .record(
                AuditEntry::new(AuditAction::Shared, TABLE)
                    .by(user.id)
                    .with_new(&json!({
                        "document_uuid": uuid,
                        "service_id": dto.service_id,
                        "created": summary.created,
                        "skipped": summary.skipped,
                    }))
                    .from_ip(ip),
            )
            .await;

        Ok(summary)
    }
}

async fn fetch_share<'e, E>(executor: E, share_id: i64) -> Result<ShareWithUsers>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, ShareWithUsers>(&format!("{} WHERE ds.id = $1", SHARE_SELECT))
        .bind(share_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load share {}: {:?}", share_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Share not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{database_pool, seed_document, seed_user};
    use chrono::{DateTime, Duration, Utc};

    fn service(pool: &PgPool) -> ShareService {
        ShareService::new(
            pool.clone(),
            Arc::new(AccessService::new(pool.clone())),
            Arc::new(ActionLogger::new(pool.clone())),
        )
    }

    fn share_dto(email: &str, level: &str, expires_at: Option<DateTime<Utc>>) -> ShareDocumentDto {
        ShareDocumentDto {
            email: email.to_string(),
            permission_level: level.to_string(),
            expires_at,
        }
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_resharing_updates_the_existing_row() {
        let pool = database_pool().await;
        let owner = seed_user(&pool).await;
        let recipient = seed_user(&pool).await;
        let document = seed_document(&pool, &owner, "contrat.pdf").await;
        let shares = service(&pool);
        let ip = ClientIp::default();

        let first = shares
            .share(document, &owner, share_dto(&recipient.email, "read", None), &ip)
            .await
            .unwrap();
        let second = shares
            .share(document, &owner, share_dto(&recipient.email, "edit", None), &ip)
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.share.id, second.share.id);

        let levels: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT ds.permission_level FROM document_shares ds
            JOIN documents d ON d.id = ds.document_id
            WHERE d.uuid = $1
            "#,
        )
        .bind(document)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(levels, vec!["edit".to_string()]);

        let notifications: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1",
        )
        .bind(recipient.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(notifications, 2);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_self_share_is_rejected() {
        let pool = database_pool().await;
        let owner = seed_user(&pool).await;
        let document = seed_document(&pool, &owner, "note.pdf").await;

        let result = service(&pool)
            .share(
                document,
                &owner,
                share_dto(&owner.email, "read", None),
                &ClientIp::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_expired_shares_are_not_listed() {
        let pool = database_pool().await;
        let owner = seed_user(&pool).await;
        let recipient = seed_user(&pool).await;
        let shares = service(&pool);
        let ip = ClientIp::default();

        let open = seed_document(&pool, &owner, "open.pdf").await;
        let future = seed_document(&pool, &owner, "future.pdf").await;
        let past = seed_document(&pool, &owner, "past.pdf").await;

        for (document, expires_at) in [
            (open, None),
            (future, Some(Utc::now() + Duration::days(1))),
            (past, Some(Utc::now() - Duration::hours(1))),
        ] {
            shares
                .share(document, &owner, share_dto(&recipient.email, "read", expires_at), &ip)
                .await
                .unwrap();
        }

        let listed: Vec<Uuid> = shares
            .shared_with_me(&recipient, &SharedWithMeQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.document.uuid)
            .collect();

        assert!(listed.contains(&open));
        assert!(listed.contains(&future));
        assert!(!listed.contains(&past));
    }
}
