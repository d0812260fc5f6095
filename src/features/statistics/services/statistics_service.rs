use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::statistics::charts::{
    actions_chart, dataset, flow_graph, last_months, month_labels, monthly_series,
    months_start, storage_breakdown, users_by_service, FlowRow, YearMonth, CHART_MONTHS,
};
use crate::features::statistics::dtos::{
    ActionPeriod, ActiveUserDto, ActiveUsersDto, ChartDto, FlowGraphDto, GlobalStatsDto,
    RecentActionsDto, RecentShareActivityDto, ShareHistoryEntryDto, ShareParticipantDto,
    SharesByServiceDto, SharesByUserDto, SharingStatsDto, StorageBreakdownDto,
};

const DELETED_DOCUMENT: &str = "Document supprimé";
const UNKNOWN_USER: &str = "Utilisateur inconnu";
const NO_SERVICE: &str = "Sans service";

/// Users whose token was used this recently count as online
const ONLINE_WINDOW_MINUTES: i64 = 15;
/// Shares this recent appear in the live activity feed
const LIVE_SHARES_WINDOW_MINUTES: i64 = 5;

/// Share joined with its document and both participants
#[derive(Debug, FromRow)]
struct ShareActivityRow {
    id: i64,
    permission_level: String,
    created_at: DateTime<Utc>,
    document_nom: Option<String>,
    document_type: Option<String>,
    document_taille: Option<i64>,
    sender_id: Option<i64>,
    sender_name: Option<String>,
    sender_email: Option<String>,
    sender_service_id: Option<i64>,
    recipient_id: Option<i64>,
    recipient_name: Option<String>,
    recipient_email: Option<String>,
    recipient_service_id: Option<i64>,
}

impl ShareActivityRow {
    fn sender(&self) -> ShareParticipantDto {
        participant(
            self.sender_id,
            &self.sender_name,
            &self.sender_email,
            self.sender_service_id,
        )
    }

    fn recipient(&self) -> ShareParticipantDto {
        participant(
            self.recipient_id,
            &self.recipient_name,
            &self.recipient_email,
            self.recipient_service_id,
        )
    }

    fn document_nom(&self) -> String {
        self.document_nom
            .clone()
            .unwrap_or_else(|| DELETED_DOCUMENT.to_string())
    }
}

fn participant(
    id: Option<i64>,
    name: &Option<String>,
    email: &Option<String>,
    service_id: Option<i64>,
) -> ShareParticipantDto {
    ShareParticipantDto {
        id,
        nom: name.clone().unwrap_or_else(|| UNKNOWN_USER.to_string()),
        email: email.clone(),
        service_id,
    }
}

const SHARE_ACTIVITY_SELECT: &str = r#"
    SELECT ds.id, ds.permission_level, ds.created_at,
           d.nom AS document_nom, d.type AS document_type, d.taille AS document_taille,
           sender.id AS sender_id, sender.name AS sender_name, sender.email AS sender_email,
           sender.service_id AS sender_service_id,
           recipient.id AS recipient_id, recipient.name AS recipient_name,
           recipient.email AS recipient_email, recipient.service_id AS recipient_service_id
    FROM document_shares ds
    LEFT JOIN documents d ON d.id = ds.document_id
    LEFT JOIN users sender ON sender.id = ds.shared_by
    LEFT JOIN users recipient ON recipient.id = ds.user_id
"#;

/// Read-only aggregations behind the admin dashboard
pub struct StatisticsService {
    pool: PgPool,
}

impl StatisticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn global(&self) -> Result<GlobalStatsDto> {
        let (total_users, total_documents, total_shared_documents) = tokio::try_join!(
            self.count("SELECT COUNT(*) FROM users"),
            self.count("SELECT COUNT(*) FROM documents WHERE deleted_at IS NULL"),
            self.count("SELECT COUNT(*) FROM document_shares"),
        )?;

        Ok(GlobalStatsDto {
            total_users,
            total_documents,
            total_shared_documents,
        })
    }

    /// Documents created and shares created per month
    pub async fn document_activity(&self) -> Result<ChartDto> {
        let months = last_months(Utc::now(), CHART_MONTHS);
        let start = chart_start(&months)?;

        let (created, shared) = tokio::try_join!(
            self.monthly_counts("documents", "created_at", "COUNT(*)", start),
            self.monthly_counts("document_shares", "created_at", "COUNT(*)", start),
        )?;

        Ok(ChartDto {
            labels: month_labels(&months),
            datasets: vec![
                dataset("Documents Créés", monthly_series(&months, &created), 0),
                dataset("Documents Partagés", monthly_series(&months, &shared), 1),
            ],
        })
    }

    pub async fn storage_breakdown(&self) -> Result<StorageBreakdownDto> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT type, COALESCE(SUM(taille), 0)::BIGINT FROM documents GROUP BY type",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to aggregate storage usage: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(storage_breakdown(&rows))
    }

    /// Distinct users with token activity per month
    pub async fn user_activity(&self) -> Result<ChartDto> {
        let months = last_months(Utc::now(), CHART_MONTHS);
        let start = chart_start(&months)?;

        let active = self
            .monthly_counts(
                "personal_access_tokens",
                "last_used_at",
                "COUNT(DISTINCT user_id)",
                start,
            )
            .await?;

        let mut series = dataset("Utilisateurs Actifs", monthly_series(&months, &active), 0);
        series.background_color = "#FFCA28".to_string();
        series.border_color = "#FFA000".to_string();

        Ok(ChartDto {
            labels: month_labels(&months),
            datasets: vec![series],
        })
    }

    pub async fn recent_actions(&self, period: ActionPeriod) -> Result<RecentActionsDto> {
        let start_date = period.start(Utc::now());

        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT action, COUNT(*) FROM log_actions WHERE created_at >= $1 GROUP BY action",
        )
        .bind(start_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count recent actions: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(RecentActionsDto {
            period,
            start_date,
            actions: rows.into_iter().collect::<BTreeMap<_, _>>(),
        })
    }

    /// One series per audited action over the chart months
    pub async fn user_actions_chart(&self) -> Result<ChartDto> {
        let months = last_months(Utc::now(), CHART_MONTHS);
        let start = chart_start(&months)?;

        let rows: Vec<(i32, i32, String, i64)> = sqlx::query_as(
            r#"
            SELECT EXTRACT(YEAR FROM created_at)::INT AS year,
                   EXTRACT(MONTH FROM created_at)::INT AS month,
                   action, COUNT(*)
            FROM log_actions
            WHERE created_at >= $1
            GROUP BY year, month, action
            ORDER BY year, month
            "#,
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to aggregate user actions: {:?}", e);
            AppError::Database(e)
        })?;

        let rows: Vec<(i32, u32, String, i64)> = rows
            .into_iter()
            .map(|(year, month, action, count)| (year, month as u32, action, count))
            .collect();

        Ok(actions_chart(&months, &rows))
    }

    pub async fn sharing(&self) -> Result<SharingStatsDto> {
        let history_query = format!(
            "{} ORDER BY ds.created_at DESC, ds.id DESC LIMIT 100",
            SHARE_ACTIVITY_SELECT
        );

        let (total_partages, history, par_utilisateur, par_service, recus_par_utilisateur) = tokio::try_join!(
            self.count("SELECT COUNT(*) FROM document_shares"),
            async {
                sqlx::query_as::<_, ShareActivityRow>(&history_query)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to load share history: {:?}", e);
                        AppError::Database(e)
                    })
            },
            self.shares_per_user("shared_by", None),
            async {
                sqlx::query_as::<_, SharesByServiceDto>(
                    r#"
                    SELECT s.id AS service_id, s.nom AS service_nom, COUNT(ds.id) AS total
                    FROM document_shares ds
                    JOIN users u ON u.id = ds.shared_by
                    JOIN services s ON s.id = u.service_id
                    GROUP BY s.id, s.nom
                    ORDER BY total DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count shares per service: {:?}", e);
                    AppError::Database(e)
                })
            },
            self.shares_per_user("user_id", Some(10)),
        )?;

        let historique_partages = history
            .iter()
            .map(|row| ShareHistoryEntryDto {
                id: row.id,
                document_nom: row.document_nom(),
                document_type: row.document_type.clone(),
                document_taille: row.document_taille,
                envoyeur: row.sender(),
                destinataire: row.recipient(),
                permission: row.permission_level.clone(),
                date: row.created_at,
            })
            .collect();

        Ok(SharingStatsDto {
            total_partages,
            historique_partages,
            par_utilisateur,
            par_service,
            recus_par_utilisateur,
        })
    }

    pub async fn document_flow(&self) -> Result<FlowGraphDto> {
        let rows = sqlx::query_as::<_, FlowRow>(
            r#"
            SELECT src.id AS source_service_id, src.nom AS source_service,
                   dst.id AS dest_service_id, dst.nom AS dest_service,
                   d.type AS mime_type, COUNT(ds.id) AS total,
                   COALESCE(SUM(d.taille), 0)::BIGINT AS total_size
            FROM document_shares ds
            JOIN users sender ON sender.id = ds.shared_by
            JOIN services src ON src.id = sender.service_id
            JOIN users recipient ON recipient.id = ds.user_id
            JOIN services dst ON dst.id = recipient.service_id
            JOIN documents d ON d.id = ds.document_id
            GROUP BY src.id, src.nom, dst.id, dst.nom, d.type
            ORDER BY src.id, dst.id, d.type
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to aggregate document flow: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(flow_graph(&rows))
    }

    /// Users online now, shares of the last few minutes, online users per service
    pub async fn active_users(&self) -> Result<ActiveUsersDto> {
        let now = Utc::now();
        let online_since = now - Duration::minutes(ONLINE_WINDOW_MINUTES);
        let shares_since = now - Duration::minutes(LIVE_SHARES_WINDOW_MINUTES);
        let recent_query = format!(
            "{} WHERE ds.created_at >= $1 ORDER BY ds.created_at DESC, ds.id DESC",
            SHARE_ACTIVITY_SELECT
        );

        let (online, recent) = tokio::try_join!(
            async {
                sqlx::query_as::<_, (i64, String, String, Option<i64>, Option<String>, DateTime<Utc>)>(
                    r#"
                    SELECT u.id, u.name, u.email, s.id, s.nom, MAX(t.last_used_at)
                    FROM personal_access_tokens t
                    JOIN users u ON u.id = t.user_id
                    LEFT JOIN services s ON s.id = u.service_id
                    WHERE t.last_used_at >= $1
                    GROUP BY u.id, u.name, u.email, s.id, s.nom
                    ORDER BY MAX(t.last_used_at) DESC
                    "#,
                )
                .bind(online_since)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load online users: {:?}", e);
                    AppError::Database(e)
                })
            },
            async {
                sqlx::query_as::<_, ShareActivityRow>(&recent_query)
                    .bind(shares_since)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to load recent shares: {:?}", e);
                        AppError::Database(e)
                    })
            },
        )?;

        let active_users: Vec<ActiveUserDto> = online
            .into_iter()
            .map(
                |(id, name, email, service_id, service_nom, last_activity)| ActiveUserDto {
                    id,
                    name,
                    email,
                    service_id,
                    service_nom: service_nom.unwrap_or_else(|| NO_SERVICE.to_string()),
                    last_activity,
                    status: "online".to_string(),
                },
            )
            .collect();

        let recent_activities = recent
            .iter()
            .map(|row| RecentShareActivityDto {
                id: row.id,
                document_nom: row.document_nom(),
                document_type: row.document_type.clone(),
                from_user: row.sender(),
                to_user: row.recipient(),
                timestamp: row.created_at,
            })
            .collect();

        Ok(ActiveUsersDto {
            users_by_service: users_by_service(&active_users),
            total_active: active_users.len(),
            active_users,
            recent_activities,
            last_update: now,
        })
    }

    async fn count(&self, sql: &str) -> Result<i64> {
        sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run count '{}': {:?}", sql, e);
                AppError::Database(e)
            })
    }

    /// `aggregate` per calendar month of `column`, from `start` on
    async fn monthly_counts(
        &self,
        table: &'static str,
        column: &'static str,
        aggregate: &'static str,
        start: DateTime<Utc>,
    ) -> Result<HashMap<YearMonth, i64>> {
        let sql = format!(
            r#"
            SELECT EXTRACT(YEAR FROM {column})::INT AS year,
                   EXTRACT(MONTH FROM {column})::INT AS month,
                   {aggregate}
            FROM {table}
            WHERE {column} >= $1
            GROUP BY year, month
            "#
        );

        let rows: Vec<(i32, i32, i64)> = sqlx::query_as(&sql)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to aggregate {} by month: {:?}", table, e);
                AppError::Database(e)
            })?;

        Ok(rows
            .into_iter()
            .map(|(year, month, count)| ((year, month as u32), count))
            .collect())
    }

    /// Shares grouped by `column` (`shared_by` for senders, `user_id` for recipients)
    async fn shares_per_user(
        &self,
        column: &'static str,
        limit: Option<i64>,
    ) -> Result<Vec<SharesByUserDto>> {
        let sql = format!(
            r#"
            SELECT u.id AS user_id, u.name AS user_name, u.email AS user_email,
                   COUNT(ds.id) AS total
            FROM document_shares ds
            JOIN users u ON u.id = ds.{column}
            GROUP BY u.id, u.name, u.email
            ORDER BY total DESC, u.id
            LIMIT $1
            "#
        );

        sqlx::query_as::<_, SharesByUserDto>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count shares per user: {:?}", e);
                AppError::Database(e)
            })
    }
}

fn chart_start(months: &[YearMonth]) -> Result<DateTime<Utc>> {
    months_start(months)
        .ok_or_else(|| AppError::Internal("Invalid chart window".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_fallbacks() {
        let p = participant(None, &None, &None, None);
        assert_eq!(p.nom, UNKNOWN_USER);
        assert!(p.id.is_none());

        let p = participant(Some(3), &Some("awa".to_string()), &None, Some(1));
        assert_eq!(p.nom, "awa");
        assert_eq!(p.service_id, Some(1));
    }

    #[test]
    fn test_chart_window_starts_on_first_month() {
        let months = last_months(Utc::now(), CHART_MONTHS);
        let start = chart_start(&months).unwrap();
        assert!(start <= Utc::now());
        assert_eq!(start, months_start(&months).unwrap());
    }
}
