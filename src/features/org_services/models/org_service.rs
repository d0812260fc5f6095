use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// An organizational department (`services` table)
#[derive(Debug, Clone, FromRow)]
pub struct OrgService {
    pub id: i64,
    pub nom: String,
    pub description: Option<String>,
    pub prix: Option<Decimal>,
    pub statut: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
