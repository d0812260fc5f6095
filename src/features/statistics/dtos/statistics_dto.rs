use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================================
// Counters & charts
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GlobalStatsDto {
    pub total_users: i64,
    pub total_documents: i64,
    pub total_shared_documents: i64,
}

/// Chart.js-shaped series
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChartDto {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDatasetDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartDatasetDto {
    pub label: String,
    pub data: Vec<i64>,
    pub background_color: String,
    pub border_color: String,
    pub tension: f64,
}

/// Bytes stored per file family
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StorageBreakdownDto {
    pub images: i64,
    pub videos: i64,
    pub audio: i64,
    pub documents: i64,
    pub archives: i64,
    pub autres: i64,
}

// ============================================================================
// Recent actions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionPeriod {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentActionsQuery {
    /// `day`, `week`, `month` (default) or `year`
    pub period: Option<ActionPeriod>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecentActionsDto {
    pub period: ActionPeriod,
    pub start_date: DateTime<Utc>,
    /// Number of audit entries per action
    pub actions: BTreeMap<String, i64>,
}

// ============================================================================
// Sharing
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareParticipantDto {
    pub id: Option<i64>,
    pub nom: String,
    pub email: Option<String>,
    pub service_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareHistoryEntryDto {
    pub id: i64,
    pub document_nom: String,
    pub document_type: Option<String>,
    pub document_taille: Option<i64>,
    pub envoyeur: ShareParticipantDto,
    pub destinataire: ShareParticipantDto,
    pub permission: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct SharesByUserDto {
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct SharesByServiceDto {
    pub service_id: i64,
    pub service_nom: String,
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharingStatsDto {
    pub total_partages: i64,
    /// Last 100 shares, newest first
    pub historique_partages: Vec<ShareHistoryEntryDto>,
    /// Shares sent per user
    pub par_utilisateur: Vec<SharesByUserDto>,
    /// Shares sent per sender service
    pub par_service: Vec<SharesByServiceDto>,
    /// Top 10 recipients
    pub recus_par_utilisateur: Vec<SharesByUserDto>,
}

// ============================================================================
// Document flow graph
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FlowNodeDto {
    pub id: usize,
    pub service_id: i64,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub size: i64,
    pub activity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FlowLinkDto {
    pub source: usize,
    pub target: usize,
    /// Number of shares along this edge
    pub value: i64,
    pub total_size: i64,
    pub types: Vec<String>,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FlowStatsDto {
    pub total_flows: i64,
    pub total_size: i64,
    pub total_services: usize,
    pub total_connections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FlowGraphDto {
    pub nodes: Vec<FlowNodeDto>,
    pub links: Vec<FlowLinkDto>,
    pub stats: FlowStatsDto,
}

// ============================================================================
// Live activity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveUserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub service_id: Option<i64>,
    pub service_nom: String,
    pub last_activity: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecentShareActivityDto {
    pub id: i64,
    pub document_nom: String,
    pub document_type: Option<String>,
    pub from_user: ShareParticipantDto,
    pub to_user: ShareParticipantDto,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UsersByServiceDto {
    pub service: String,
    pub count: usize,
    pub users: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActiveUsersDto {
    pub active_users: Vec<ActiveUserDto>,
    pub total_active: usize,
    pub recent_activities: Vec<RecentShareActivityDto>,
    pub users_by_service: Vec<UsersByServiceDto>,
    pub last_update: DateTime<Utc>,
}
