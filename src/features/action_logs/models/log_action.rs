use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Audit row joined with the acting user
#[derive(Debug, Clone, FromRow)]
pub struct LogActionWithUser {
    pub id: i64,
    pub action: String,
    pub table_affectee: String,
    pub user_id: Option<i64>,
    pub nouvelles_valeurs: Option<JsonValue>,
    pub anciennes_valeurs: Option<JsonValue>,
    pub adresse_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}
