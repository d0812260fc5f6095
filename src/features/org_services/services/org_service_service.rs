use std::collections::HashMap;
use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientIp;
use crate::features::action_logs::{ActionLogger, AuditAction, AuditEntry};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::org_services::dtos::{
    CreateOrgServiceDto, OrgServiceResponseDto, UpdateOrgServiceDto,
};
use crate::features::org_services::models::OrgService;
use crate::shared::constants::STATUS_ACTIVE;
use crate::shared::filter::{FilterParams, FilterSpec};

const TABLE: &str = "services";

pub const ORG_SERVICE_FILTER: FilterSpec = FilterSpec {
    alias: "s",
    columns: &["id", "nom", "prix", "statut", "created_at", "updated_at"],
    keyword_columns: &["nom", "description"],
    date_column: "created_at",
    default_sort: "created_at",
};

const SELECT: &str =
    "SELECT s.id, s.nom, s.description, s.prix, s.statut, s.created_at, s.updated_at FROM services s";

pub struct OrgServiceService {
    pool: PgPool,
    audit: Arc<ActionLogger>,
}

impl OrgServiceService {
    pub fn new(pool: PgPool, audit: Arc<ActionLogger>) -> Self {
        Self { pool, audit }
    }

    pub async fn list(
        &self,
        query: &HashMap<String, String>,
    ) -> Result<(Vec<OrgServiceResponseDto>, i64)> {
        let params = FilterParams::from_query(query, &ORG_SERVICE_FILTER)?;

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM services s WHERE TRUE");
        params.push_conditions(&mut count, &ORG_SERVICE_FILTER);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count services: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(SELECT);
        select.push(" WHERE TRUE");
        params.push_conditions(&mut select, &ORG_SERVICE_FILTER);
        params.push_order_and_page(&mut select, &ORG_SERVICE_FILTER);

        let rows: Vec<OrgService> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list services: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, id: i64) -> Result<OrgServiceResponseDto> {
        self.find(id).await.map(Into::into)
    }

    /// The department the caller belongs to
    pub async fn for_user(&self, user: &AuthenticatedUser) -> Result<OrgServiceResponseDto> {
        let id = user.service_id.ok_or_else(|| {
            AppError::NotFound("No service is assigned to this user".to_string())
        })?;
        self.get(id).await
    }

    pub async fn create(
        &self,
        dto: CreateOrgServiceDto,
        admin: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<OrgServiceResponseDto> {
        let service = sqlx::query_as::<_, OrgService>(
            r#"
            INSERT INTO services (nom, description, prix, statut)
            VALUES ($1, $2, $3, $4)
            RETURNING id, nom, description, prix, statut, created_at, updated_at
            "#,
        )
        .bind(dto.nom.trim())
        .bind(&dto.description)
        .bind(dto.prix)
        .bind(dto.statut.as_deref().unwrap_or(STATUS_ACTIVE))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create service: {:?}", e);
            AppError::Database(e)
        })?;

        let response: OrgServiceResponseDto = service.into();
        self.audit
            .record(
                AuditEntry::new(AuditAction::Created, TABLE)
                    .by(admin.id)
                    .with_new(&response)
                    .from_ip(ip),
            )
            .await;

        Ok(response)
    }

    pub async fn update(
        &self,
        id: i64,
        dto: UpdateOrgServiceDto,
        admin: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<OrgServiceResponseDto> {
        let before: OrgServiceResponseDto = self.find(id).await?.into();

        let service = sqlx::query_as::<_, OrgService>(
            r#"
            UPDATE services
            SET nom = COALESCE($2, nom),
                description = COALESCE($3, description),
                prix = COALESCE($4, prix),
                statut = COALESCE($5, statut),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, nom, description, prix, statut, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(dto.nom.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(dto.prix)
        .bind(&dto.statut)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update service {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))?;

        let response: OrgServiceResponseDto = service.into();
        self.audit
            .record(
                AuditEntry::new(AuditAction::Updated, TABLE)
                    .by(admin.id)
                    .with_old(&before)
                    .with_new(&response)
                    .from_ip(ip),
            )
            .await;

        Ok(response)
    }

    /// Members and documents of the service keep existing with `service_id = NULL`
    pub async fn delete(&self, id: i64, admin: &AuthenticatedUser, ip: &ClientIp) -> Result<()> {
        let before: OrgServiceResponseDto = self.find(id).await?.into();

        sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete service {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::Deleted, TABLE)
                    .by(admin.id)
                    .with_old(&before)
                    .from_ip(ip),
            )
            .await;

        Ok(())
    }

    /// Delete several services at once; unknown ids are ignored
    pub async fn delete_many(
        &self,
        ids: &[i64],
        admin: &AuthenticatedUser,
        ip: &ClientIp,
    ) -> Result<u64> {
        let deleted: Vec<i64> =
            sqlx::query_scalar("DELETE FROM services WHERE id = ANY($1) RETURNING id")
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to delete services: {:?}", e);
                    AppError::Database(e)
                })?;

        if !deleted.is_empty() {
            self.audit
                .record(
                    AuditEntry::new(AuditAction::Deleted, TABLE)
                        .by(admin.id)
                        .with_old(&serde_json::json!({ "ids": deleted }))
                        .from_ip(ip),
                )
                .await;
        }

        Ok(deleted.len() as u64)
    }

    async fn find(&self, id: i64) -> Result<OrgService> {
        sqlx::query_as::<_, OrgService>(&format!("{} WHERE s.id = $1", SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get service {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))
    }
}
