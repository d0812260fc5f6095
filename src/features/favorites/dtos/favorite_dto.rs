use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::documents::dtos::DocumentResponseDto;
use crate::features::favorites::models::FavoriteWithDocument;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddFavoriteDto {
    pub document_uuid: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FavoriteResponseDto {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub document: DocumentResponseDto,
}

impl From<FavoriteWithDocument> for FavoriteResponseDto {
    fn from(row: FavoriteWithDocument) -> Self {
        Self {
            id: row.favori_id,
            created_at: row.favorited_at,
            document: row.document.into(),
        }
    }
}
