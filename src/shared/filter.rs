//! Generic list filtering shared by the admin listings (services, users, action logs).
//!
//! Query parameters understood:
//! - `search_by_keyword`: case-insensitive match over the table's keyword columns
//! - `sort_key` / `sort_order`: ordering on a whitelisted column
//! - `period_from` / `period_to`: inclusive day range on the date column
//! - `rows` / `page`: pagination
//! - any whitelisted column: `col=value` (equality), `col=!value` (inequality),
//!   `col=[a/b/c]` (membership)
//!
//! Column names only ever come from the static [`FilterSpec`], never from the request.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use utoipa::IntoParams;

use crate::core::error::{AppError, Result};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::mime::mime_for_extension;

/// Whitelist describing which columns of a table can be filtered and sorted.
#[derive(Debug, Clone, Copy)]
pub struct FilterSpec {
    /// Table alias used in the surrounding query (e.g. `u` for `users u`)
    pub alias: &'static str,
    /// Columns accepted as `col=value` filters and as `sort_key`
    pub columns: &'static [&'static str],
    /// Columns searched by `search_by_keyword`
    pub keyword_columns: &'static [&'static str],
    /// Column used by `period_from` / `period_to`
    pub date_column: &'static str,
    /// Sort column when `sort_key` is absent or not whitelisted
    pub default_sort: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A single column condition parsed from the raw query value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFilter {
    Equals(String),
    NotEquals(String),
    In(Vec<String>),
}

impl ColumnFilter {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.len() >= 2 && raw.starts_with('[') && raw.ends_with(']') {
            let values = raw[1..raw.len() - 1]
                .split('/')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
            return ColumnFilter::In(values);
        }
        if let Some(rest) = raw.strip_prefix('!') {
            return ColumnFilter::NotEquals(rest.to_string());
        }
        ColumnFilter::Equals(raw.to_string())
    }
}

/// Parsed and whitelisted filter parameters.
#[derive(Debug, Clone)]
pub struct FilterParams {
    pub keyword: Option<String>,
    pub sort_key: &'static str,
    pub sort_order: SortOrder,
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
    pub rows: i64,
    pub page: i64,
    pub columns: Vec<(&'static str, ColumnFilter)>,
}

const RESERVED_KEYS: &[&str] = &[
    "search_by_keyword",
    "sort_key",
    "sort_order",
    "period_from",
    "period_to",
    "rows",
    "page",
];

impl FilterParams {
    pub fn from_query(query: &HashMap<String, String>, spec: &FilterSpec) -> Result<Self> {
        let keyword = query
            .get("search_by_keyword")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let sort_key = query
            .get("sort_key")
            .and_then(|key| spec.columns.iter().find(|c| **c == key.as_str()))
            .copied()
            .unwrap_or(spec.default_sort);

        let sort_order = query
            .get("sort_order")
            .map(|o| SortOrder::parse(o))
            .unwrap_or_default();

        let period_from = parse_date(query.get("period_from"), "period_from")?;
        let period_to = parse_date(query.get("period_to"), "period_to")?;

        let rows = parse_positive(query.get("rows"), DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        let page = parse_positive(query.get("page"), 1);

        // Iterate the whitelist, not the request, so ordering is deterministic
        let columns = spec
            .columns
            .iter()
            .filter(|c| !RESERVED_KEYS.contains(c))
            .filter_map(|c| {
                query
                    .get(*c)
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (*c, ColumnFilter::parse(v)))
            })
            .collect();

        Ok(Self {
            keyword,
            sort_key,
            sort_order,
            period_from,
            period_to,
            rows,
            page,
            columns,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.rows)
    }

    /// Append `AND ...` conditions. The builder must already contain a `WHERE` clause.
    pub fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>, spec: &FilterSpec) {
        if let Some(keyword) = &self.keyword {
            if !spec.keyword_columns.is_empty() {
                let pattern = like_pattern(keyword);
                builder.push(" AND (");
                for (i, column) in spec.keyword_columns.iter().enumerate() {
                    if i > 0 {
                        builder.push(" OR ");
                    }
                    builder
                        .push(format!("{}.{}::text ILIKE ", spec.alias, column))
                        .push_bind(pattern.clone());
                }
                builder.push(")");
            }
        }

        if let Some(from) = self.period_from {
            builder
                .push(format!(" AND {}.{} >= ", spec.alias, spec.date_column))
                .push_bind(from.and_hms_opt(0, 0, 0).map(|d| d.and_utc()));
        }
        if let Some(to) = self.period_to {
            let end = (to + Duration::days(1)).and_hms_opt(0, 0, 0).map(|d| d.and_utc());
            builder
                .push(format!(" AND {}.{} < ", spec.alias, spec.date_column))
                .push_bind(end);
        }

        for (column, filter) in &self.columns {
            let qualified = format!("{}.{}::text", spec.alias, column);
            match filter {
                ColumnFilter::Equals(value) => {
                    builder
                        .push(format!(" AND {} = ", qualified))
                        .push_bind(value.clone());
                }
                ColumnFilter::NotEquals(value) => {
                    builder
                        .push(format!(" AND {} IS DISTINCT FROM ", qualified))
                        .push_bind(value.clone());
                }
                ColumnFilter::In(values) => {
                    builder
                        .push(format!(" AND {} = ANY(", qualified))
                        .push_bind(values.clone())
                        .push(")");
                }
            }
        }
    }

    /// Append `ORDER BY ... LIMIT ... OFFSET ...`
    pub fn push_order_and_page(&self, builder: &mut QueryBuilder<'_, Postgres>, spec: &FilterSpec) {
        builder
            .push(format!(
                " ORDER BY {}.{} {}, {}.id {}",
                spec.alias,
                self.sort_key,
                self.sort_order.as_sql(),
                spec.alias,
                self.sort_order.as_sql()
            ))
            .push(" LIMIT ")
            .push_bind(self.rows)
            .push(" OFFSET ")
            .push_bind(self.offset());
    }
}

/// Documentation-only mirror of the query parameters understood by [`FilterParams`].
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(dead_code)]
pub struct FilterQuery {
    /// Case-insensitive keyword matched against the listing's text columns
    pub search_by_keyword: Option<String>,
    /// Column to sort on (must be one of the filterable columns)
    pub sort_key: Option<String>,
    /// `asc` or `desc` (default)
    pub sort_order: Option<String>,
    /// Start day (YYYY-MM-DD) on creation date, inclusive
    pub period_from: Option<String>,
    /// End day (YYYY-MM-DD) on creation date, inclusive
    pub period_to: Option<String>,
    /// Rows per page (default 10, max 100)
    pub rows: Option<i64>,
    /// Page number (1-indexed)
    pub page: Option<i64>,
}

/// Wrap a user keyword into an ILIKE pattern with LIKE wildcards escaped.
pub fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Append ` AND ...` restricting documents by type. Accepts a full mime type (`image/png`), a
/// mime family (`image/`) or a bare extension (`pdf`, `.docx`).
pub fn push_type_condition(builder: &mut QueryBuilder<'_, Postgres>, alias: &str, raw: &str) {
    let raw = raw.trim().to_ascii_lowercase();
    if raw.is_empty() {
        return;
    }
    if raw.ends_with('/') {
        builder
            .push(format!(" AND LOWER({alias}.type) LIKE "))
            .push_bind(format!("{}%", raw.replace(['%', '_'], "")));
    } else if raw.contains('/') {
        builder
            .push(format!(" AND LOWER({alias}.type) = "))
            .push_bind(raw);
    } else if let Some(mime) = mime_for_extension(&raw) {
        builder
            .push(format!(" AND LOWER({alias}.type) = "))
            .push_bind(mime.to_string());
    } else {
        let ext = raw.trim_start_matches('.');
        builder
            .push(format!(" AND {alias}.nom ILIKE "))
            .push_bind(format!("%.{}", ext.replace(['%', '_', '\\'], "")));
    }
}

fn parse_date(value: Option<&String>, field: &str) -> Result<Option<NaiveDate>> {
    match value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => {
            // Accept both plain dates and full timestamps, keeping the date part
            let day = raw.get(..10).unwrap_or(raw);
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| AppError::Validation(format!("{} must be a date (YYYY-MM-DD)", field)))
        }
    }
}

fn parse_positive(value: Option<&String>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: FilterSpec = FilterSpec {
        alias: "u",
        columns: &["id", "name", "email", "statut", "role", "created_at"],
        keyword_columns: &["name", "email"],
        date_column: "created_at",
        default_sort: "created_at",
    };

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_column_filter_parse() {
        assert_eq!(
            ColumnFilter::parse("actif"),
            ColumnFilter::Equals("actif".into())
        );
        assert_eq!(
            ColumnFilter::parse("!suspendu"),
            ColumnFilter::NotEquals("suspendu".into())
        );
        assert_eq!(
            ColumnFilter::parse("[actif/inactif]"),
            ColumnFilter::In(vec!["actif".into(), "inactif".into()])
        );
        assert_eq!(ColumnFilter::parse("[]"), ColumnFilter::In(vec![]));
    }

    #[test]
    fn test_defaults() {
        let params = FilterParams::from_query(&HashMap::new(), &SPEC).unwrap();
        assert_eq!(params.rows, DEFAULT_PAGE_SIZE);
        assert_eq!(params.page, 1);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.sort_key, "created_at");
        assert_eq!(params.sort_order, SortOrder::Desc);
        assert!(params.keyword.is_none());
        assert!(params.columns.is_empty());
    }

    #[test]
    fn test_unknown_columns_and_sort_keys_are_ignored() {
        let params = FilterParams::from_query(
            &query(&[
                ("password", "x"),
                ("sort_key", "password; DROP TABLE users"),
                ("statut", "actif"),
            ]),
            &SPEC,
        )
        .unwrap();

        assert_eq!(params.sort_key, "created_at");
        assert_eq!(
            params.columns,
            vec![("statut", ColumnFilter::Equals("actif".into()))]
        );
    }

    #[test]
    fn test_rows_and_page() {
        let params =
            FilterParams::from_query(&query(&[("rows", "500"), ("page", "3")]), &SPEC).unwrap();
        assert_eq!(params.rows, MAX_PAGE_SIZE);
        assert_eq!(params.offset(), 200);

        let params =
            FilterParams::from_query(&query(&[("rows", "-1"), ("page", "abc")]), &SPEC).unwrap();
        assert_eq!(params.rows, DEFAULT_PAGE_SIZE);
        assert_eq!(params.page, 1);

        let huge = i64::MAX.to_string();
        let params = FilterParams::from_query(&query(&[("page", huge.as_str())]), &SPEC).unwrap();
        assert_eq!(params.offset(), i64::MAX);
    }

    #[test]
    fn test_invalid_period_is_rejected() {
        let err = FilterParams::from_query(&query(&[("period_from", "yesterday")]), &SPEC)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let params = FilterParams::from_query(
            &query(&[("period_from", "2025-01-01"), ("period_to", "2025-01-31T10:00:00")]),
            &SPEC,
        )
        .unwrap();
        assert_eq!(params.period_from, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(params.period_to, NaiveDate::from_ymd_opt(2025, 1, 31));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rapport"), "%rapport%");
        assert_eq!(like_pattern("100%_x"), "%100\\%\\_x%");
    }

    #[test]
    fn test_generated_sql_uses_whitelisted_columns_only() {
        let params = FilterParams::from_query(
            &query(&[
                ("search_by_keyword", "awa"),
                ("statut", "[actif/inactif]"),
                ("role", "!1"),
                ("sort_key", "name"),
                ("sort_order", "asc"),
            ]),
            &SPEC,
        )
        .unwrap();

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM users u WHERE 1 = 1");
        params.push_conditions(&mut builder, &SPEC);
        params.push_order_and_page(&mut builder, &SPEC);
        let sql = builder.sql();

        assert!(sql.contains("(u.name::text ILIKE $1 OR u.email::text ILIKE $2)"));
        assert!(sql.contains("u.statut::text = ANY($3)"));
        assert!(sql.contains("u.role::text IS DISTINCT FROM $4"));
        assert!(sql.contains("ORDER BY u.name ASC, u.id ASC LIMIT $5 OFFSET $6"));
    }

    #[test]
    fn test_type_condition() {
        let sql_for = |raw: &str| {
            let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM documents d WHERE TRUE");
            push_type_condition(&mut builder, "d", raw);
            builder.sql().to_string()
        };

        assert!(sql_for("application/PDF").ends_with(" AND LOWER(d.type) = $1"));
        assert!(sql_for("image/").ends_with(" AND LOWER(d.type) LIKE $1"));
        assert!(sql_for(".docx").ends_with(" AND LOWER(d.type) = $1"));
        assert!(sql_for("xyz").ends_with(" AND d.nom ILIKE $1"));
        assert_eq!(sql_for("  "), "SELECT * FROM documents d WHERE TRUE");
    }
}
