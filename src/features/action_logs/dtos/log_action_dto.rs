use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::action_logs::models::LogActionWithUser;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogActionUserDto {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogActionResponseDto {
    pub id: i64,
    pub action: String,
    pub table_affectee: String,
    pub user_id: Option<i64>,
    pub user: Option<LogActionUserDto>,
    #[schema(value_type = Option<Object>)]
    pub nouvelles_valeurs: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub anciennes_valeurs: Option<serde_json::Value>,
    pub adresse_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<LogActionWithUser> for LogActionResponseDto {
    fn from(row: LogActionWithUser) -> Self {
        let user = row.user_id.map(|id| LogActionUserDto {
            id,
            name: row.user_name,
            email: row.user_email,
        });

        Self {
            id: row.id,
            action: row.action,
            table_affectee: row.table_affectee,
            user_id: row.user_id,
            user,
            nouvelles_valeurs: row.nouvelles_valeurs,
            anciennes_valeurs: row.anciennes_valeurs,
            adresse_ip: row.adresse_ip,
            created_at: row.created_at,
        }
    }
}
