use chrono::Duration;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::access::policy::push_visible_condition;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::DocumentResponseDto;
use crate::features::documents::models::{DocumentWithRelations, DOCUMENT_SELECT};
use crate::features::search::dtos::{
    DocumentSearchQuery, FilterOptionsDto, PersonOptionDto, ServiceOptionDto, TypeOptionDto,
    SEARCH_SORT_COLUMNS,
};
use crate::shared::constants::SEARCH_DEFAULT_PER_PAGE;
use crate::shared::filter::{like_pattern, push_type_condition, SortOrder};
use crate::shared::mime::categorize;
use crate::shared::types::PaginationQuery;

#[derive(Debug, FromRow)]
struct ServiceOptionRow {
    id: i64,
    nom: String,
    description: Option<String>,
    document_count: i64,
}

/// Search over every document the caller can see
pub struct SearchService {
    pool: PgPool,
}

impl SearchService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Filtered, ordered page of visible documents with the total match count
    pub async fn search(
        &self,
        user: &AuthenticatedUser,
        query: &DocumentSearchQuery,
    ) -> Result<(Vec<DocumentResponseDto>, i64)> {
        let page = PaginationQuery::new(
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(SEARCH_DEFAULT_PER_PAGE),
        );
        let sort_by = query
            .sort_by
            .as_deref()
            .filter(|column| SEARCH_SORT_COLUMNS.contains(column))
            .unwrap_or("created_at");
        let sort_order = query
            .sort_order
            .as_deref()
            .map(SortOrder::parse)
            .unwrap_or(SortOrder::Desc);

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM documents d WHERE TRUE");
        push_search_conditions(&mut count, user.id, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count search results: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(DOCUMENT_SELECT);
        select.push(" WHERE TRUE");
        push_search_conditions(&mut select, user.id, query);
        select
            .push(format!(
                " ORDER BY d.{} {}, d.id {}",
                sort_by,
                sort_order.as_sql(),
                sort_order.as_sql()
            ))
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<DocumentWithRelations> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search documents: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Values offered by the advanced search form, computed over the visible documents
    pub async fn filter_options(&self, user: &AuthenticatedUser) -> Result<FilterOptionsDto> {
        let mut types = visible_documents(user.id);
        types.push(
            " SELECT v.type, COUNT(*) FROM visible v GROUP BY v.type ORDER BY COUNT(*) DESC, v.type",
        );

        let mut people = visible_documents(user.id);
        people.push(
            r#"
            SELECT u.id, u.name, u.email, COUNT(v.id) AS document_count
            FROM visible v
            JOIN users u ON u.id = v.user_id
            GROUP BY u.id, u.name, u.email
            ORDER BY u.name, u.id
            "#,
        );

        let mut services = visible_documents(user.id);
        services.push(
            r#"
            SELECT s.id, s.nom, s.description, COUNT(v.id) AS document_count
            FROM services s
            LEFT JOIN visible v ON v.service_id = s.id
            GROUP BY s.id, s.nom, s.description
            ORDER BY s.nom, s.id
            "#,
        );

        let (type_rows, people, service_rows) = tokio::try_join!(
            async {
                types
                    .build_query_as::<(String, i64)>()
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to load type options: {:?}", e);
                        AppError::Database(e)
                    })
            },
            async {
                people
                    .build_query_as::<PersonOptionDto>()
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to load people options: {:?}", e);
                        AppError::Database(e)
                    })
            },
            async {
                services
                    .build_query_as::<ServiceOptionRow>()
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to load service options: {:?}", e);
                        AppError::Database(e)
                    })
            },
        )?;

        let services = service_rows
            .into_iter()
            .map(|row| {
                let is_user_service = user.service_id == Some(row.id);
                ServiceOptionDto {
                    id: row.id,
                    nom: row.nom,
                    description: row.description,
                    is_user_service,
                    document_count: row.document_count,
                    accessible: is_user_service,
                }
            })
            .collect();

        Ok(FilterOptionsDto {
            types: group_type_options(type_rows),
            people,
            services,
            user_service_id: user.service_id,
        })
    }
}

/// `WITH visible AS (...)` prefix; callers append the main `SELECT`
fn visible_documents(user_id: i64) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "WITH visible AS (SELECT d.id, d.type, d.user_id, d.service_id FROM documents d WHERE TRUE",
    );
    push_visible_condition(&mut builder, "d", user_id);
    builder.push(")");
    builder
}

fn push_search_conditions(
    builder: &mut QueryBuilder<'_, Postgres>,
    user_id: i64,
    query: &DocumentSearchQuery,
) {
    push_visible_condition(builder, "d", user_id);

    if let Some(keyword) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = like_pattern(keyword);
        builder
            .push(" AND (d.nom ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR d.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(raw) = query.mime_type.as_deref() {
        push_type_condition(builder, "d", raw);
    }
    if let Some(owner) = query.user_id {
        builder.push(" AND d.user_id = ").push_bind(owner);
    }
    if let Some(service_id) = query.service_id {
        builder.push(" AND d.service_id = ").push_bind(service_id);
    }
    if let Some(from) = query.date_from.and_then(|d| d.and_hms_opt(0, 0, 0)) {
        builder.push(" AND d.created_at >= ").push_bind(from.and_utc());
    }
    if let Some(to) = query
        .date_to
        .and_then(|d| (d + Duration::days(1)).and_hms_opt(0, 0, 0))
    {
        builder.push(" AND d.created_at < ").push_bind(to.and_utc());
    }
}

/// Fold `(mime type, count)` rows into display categories, keeping row order
pub fn group_type_options(rows: Vec<(String, i64)>) -> Vec<TypeOptionDto> {
    let mut groups: Vec<TypeOptionDto> = Vec::new();
    for (mime, count) in rows {
        let category = categorize(&mime).label();
        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => {
                group.count += count;
                if !group.mime_types.contains(&mime) {
                    group.mime_types.push(mime);
                }
            }
            None => groups.push(TypeOptionDto {
                category: category.to_string(),
                count,
                mime_types: vec![mime],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_type_options() {
        let rows = vec![
            ("application/pdf".to_string(), 7),
            ("image/png".to_string(), 4),
            ("image/jpeg".to_string(), 2),
            ("application/x-unknown".to_string(), 1),
        ];
        let groups = group_type_options(rows);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].category, "PDF");
        assert_eq!(groups[1].category, "Image");
        assert_eq!(groups[1].count, 6);
        assert_eq!(groups[1].mime_types, vec!["image/png", "image/jpeg"]);
        assert_eq!(groups[2].category, "Autre");
    }

    #[test]
    fn test_search_conditions_are_scoped_to_visible_documents() {
        let query = DocumentSearchQuery {
            q: Some("budget".to_string()),
            mime_type: Some("pdf".to_string()),
            service_id: Some(3),
            ..Default::default()
        };
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM documents d WHERE TRUE");
        push_search_conditions(&mut builder, 2, &query);
        let sql = builder.sql();

        assert!(sql.contains("d.deleted_at IS NULL"));
        assert!(sql.contains("EXISTS (SELECT 1 FROM document_shares ds"));
        assert!(sql.contains("d.nom ILIKE"));
        assert!(sql.contains("LOWER(d.type) = "));
        assert!(sql.contains("d.service_id = "));
        assert!(!sql.contains("d.created_at"));
    }
}
