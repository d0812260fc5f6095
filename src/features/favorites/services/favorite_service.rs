use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::access::AccessService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::favorites::dtos::FavoriteResponseDto;
use crate::features::favorites::models::{FavoriteWithDocument, FAVORITE_SELECT};

pub struct FavoriteService {
    pool: PgPool,
    access: Arc<AccessService>,
}

impl FavoriteService {
    pub fn new(pool: PgPool, access: Arc<AccessService>) -> Self {
        Self { pool, access }
    }

    /// Favorites whose document is not in the trash, newest first
    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<FavoriteResponseDto>> {
        let rows = sqlx::query_as::<_, FavoriteWithDocument>(&format!(
            "{} WHERE f.user_id = $1 AND d.deleted_at IS NULL ORDER BY f.created_at DESC, f.id DESC",
            FAVORITE_SELECT
        ))
        .bind(user.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list favorites: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Bookmark a document the caller can see
    pub async fn add(&self, user: &AuthenticatedUser, uuid: Uuid) -> Result<FavoriteResponseDto> {
        let (document, _) = self.access.visible_document(uuid, user).await?;

        let favori_id: i64 = sqlx::query_scalar(
            "INSERT INTO favoris (user_id, document_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(user.id)
        .bind(document.document.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Document is already in favorites".to_string())
            } else {
                tracing::error!("Failed to add favorite: {:?}", e);
                AppError::Database(e)
            }
        })?;

        let row = sqlx::query_as::<_, FavoriteWithDocument>(&format!(
            "{} WHERE f.id = $1",
            FAVORITE_SELECT
        ))
        .bind(favori_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load favorite {}: {:?}", favori_id, e);
            AppError::Database(e)
        })?;

        Ok(row.into())
    }

    pub async fn remove(&self, user: &AuthenticatedUser, uuid: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM favoris f
            USING documents d
            WHERE d.id = f.document_id AND d.uuid = $1 AND f.user_id = $2
            "#,
        )
        .bind(uuid)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to remove favorite: {:?}", e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Favorite not found".to_string()));
        }
        Ok(())
    }
}
