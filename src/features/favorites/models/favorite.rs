use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::documents::models::DocumentWithRelations;

/// A favorite row joined with the document it points at
#[derive(Debug, Clone, FromRow)]
pub struct FavoriteWithDocument {
    pub favori_id: i64,
    pub favorited_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub document: DocumentWithRelations,
}

/// `f` is the favoris alias, `d` the documents alias
pub const FAVORITE_SELECT: &str = r#"
    SELECT f.id AS favori_id, f.created_at AS favorited_at,
           d.id, d.uuid, d.nom, d.chemin, d.type, d.taille, d.description, d.user_id,
           d.service_id, d.created_at, d.updated_at, d.deleted_at,
           s.nom AS service_nom, o.name AS owner_name
    FROM favoris f
    JOIN documents d ON d.id = f.document_id
    LEFT JOIN services s ON s.id = d.service_id
    LEFT JOIN users o ON o.id = d.user_id
"#;
