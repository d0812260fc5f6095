use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::action_logs::dtos::LogActionResponseDto;
use crate::features::action_logs::models::LogActionWithUser;
use crate::shared::filter::{FilterParams, FilterSpec};

pub const LOG_ACTION_FILTER: FilterSpec = FilterSpec {
    alias: "l",
    columns: &[
        "id",
        "action",
        "table_affectee",
        "user_id",
        "adresse_ip",
        "created_at",
    ],
    keyword_columns: &["action", "table_affectee", "adresse_ip"],
    date_column: "created_at",
    default_sort: "created_at",
};

const SELECT_WITH_USER: &str = r#"
    SELECT l.id, l.action, l.table_affectee, l.user_id, l.nouvelles_valeurs, l.anciennes_valeurs,
           l.adresse_ip, l.created_at, u.name AS user_name, u.email AS user_email
    FROM log_actions l
    LEFT JOIN users u ON u.id = l.user_id
"#;

/// Read side of the audit trail
pub struct ActionLogService {
    pool: PgPool,
}

impl ActionLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &HashMap<String, String>,
    ) -> Result<(Vec<LogActionResponseDto>, i64)> {
        let params = FilterParams::from_query(query, &LOG_ACTION_FILTER)?;

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM log_actions l WHERE TRUE");
        params.push_conditions(&mut count, &LOG_ACTION_FILTER);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count action logs: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_WITH_USER);
        select.push(" WHERE TRUE");
        params.push_conditions(&mut select, &LOG_ACTION_FILTER);
        params.push_order_and_page(&mut select, &LOG_ACTION_FILTER);

        let rows: Vec<LogActionWithUser> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list action logs: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, id: i64) -> Result<LogActionResponseDto> {
        let row = sqlx::query_as::<_, LogActionWithUser>(&format!(
            "{} WHERE l.id = $1",
            SELECT_WITH_USER
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get action log: {:?}", e);
            AppError::Database(e)
        })?;

        row.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Action log {} not found", id)))
    }
}
