use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::action_logs::{dtos as action_logs_dtos, handlers as action_logs_handlers};
use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::documents::{dtos as documents_dtos, handlers as documents_handlers};
use crate::features::favorites::{dtos as favorites_dtos, handlers as favorites_handlers};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
};
use crate::features::org_services::{dtos as org_services_dtos, handlers as org_services_handlers};
use crate::features::search::{dtos as search_dtos, handlers as search_handlers};
use crate::features::share_links::{dtos as share_links_dtos, handlers as share_links_handlers};
use crate::features::shares::{dtos as shares_dtos, handlers as shares_handlers};
use crate::features::statistics::{dtos as statistics_dtos, handlers as statistics_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::logout,
        auth_handlers::get_me,
        // Documents
        documents_handlers::list_documents,
        documents_handlers::upload_document,
        documents_handlers::get_document,
        documents_handlers::update_document,
        documents_handlers::download_document,
        documents_handlers::preview_document,
        documents_handlers::send_document_email,
        documents_handlers::trash_document,
        documents_handlers::list_trash,
        documents_handlers::restore_document,
        documents_handlers::force_delete_document,
        documents_handlers::recent_documents,
        documents_handlers::search_recent_documents,
        // Search
        search_handlers::search_documents,
        search_handlers::filter_options,
        // Shares
        shares_handlers::share_document,
        shares_handlers::share_with_service,
        shares_handlers::list_document_shares,
        shares_handlers::remove_document_share,
        shares_handlers::remove_share,
        shares_handlers::leave_share,
        shares_handlers::shared_with_me,
        // Share links
        share_links_handlers::create_share_link,
        share_links_handlers::shared_document_info,
        share_links_handlers::access_shared_document,
        // Favorites
        favorites_handlers::list_favorites,
        favorites_handlers::add_favorite,
        favorites_handlers::remove_favorite,
        // Notifications
        notifications_handlers::list_notifications,
        notifications_handlers::unread_count,
        notifications_handlers::mark_read,
        notifications_handlers::mark_all_read,
        notifications_handlers::delete_notification,
        // Services
        org_services_handlers::list_services,
        org_services_handlers::get_service,
        org_services_handlers::get_my_service,
        org_services_handlers::create_service,
        org_services_handlers::update_service,
        org_services_handlers::delete_service,
        org_services_handlers::destroy_service_group,
        // Users (admin)
        users_handlers::list_users,
        users_handlers::get_user,
        users_handlers::create_user,
        users_handlers::update_user,
        users_handlers::freeze_user,
        users_handlers::unfreeze_user,
        users_handlers::reset_password,
        users_handlers::assign_role,
        users_handlers::assign_service,
        // Statistics (admin)
        statistics_handlers::global_stats,
        statistics_handlers::document_activity,
        statistics_handlers::storage_breakdown,
        statistics_handlers::user_activity,
        statistics_handlers::recent_actions,
        statistics_handlers::user_actions_chart,
        statistics_handlers::sharing_stats,
        statistics_handlers::document_flow,
        statistics_handlers::active_users,
        // Action logs (admin)
        action_logs_handlers::list_action_logs,
        action_logs_handlers::get_action_log,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::AuthResponseDto,
            ApiResponse<auth_dtos::AuthResponseDto>,
            // Users
            users_dtos::UserResponseDto,
            users_dtos::CreateUserDto,
            users_dtos::UpdateUserDto,
            users_dtos::ResetPasswordDto,
            users_dtos::AssignRoleDto,
            users_dtos::AssignServiceDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            // Documents
            documents_dtos::DocumentResponseDto,
            documents_dtos::UploadDocumentForm,
            documents_dtos::UpdateDocumentDto,
            documents_dtos::TrashResponseDto,
            documents_dtos::SendDocumentEmailDto,
            documents_dtos::RecentSource,
            documents_dtos::RecentDocumentDto,
            ApiResponse<documents_dtos::DocumentResponseDto>,
            ApiResponse<Vec<documents_dtos::DocumentResponseDto>>,
            ApiResponse<documents_dtos::TrashResponseDto>,
            ApiResponse<Vec<documents_dtos::RecentDocumentDto>>,
            // Search
            search_dtos::TypeOptionDto,
            search_dtos::PersonOptionDto,
            search_dtos::ServiceOptionDto,
            search_dtos::FilterOptionsDto,
            ApiResponse<search_dtos::FilterOptionsDto>,
            // Shares
            shares_dtos::ShareDocumentDto,
            shares_dtos::ShareByServiceDto,
            shares_dtos::ShareUserDto,
            shares_dtos::ShareResponseDto,
            shares_dtos::SharedWithMeDto,
            shares_dtos::ShareByServiceSummaryDto,
            ApiResponse<shares_dtos::ShareResponseDto>,
            ApiResponse<Vec<shares_dtos::ShareResponseDto>>,
            ApiResponse<Vec<shares_dtos::SharedWithMeDto>>,
            ApiResponse<shares_dtos::ShareByServiceSummaryDto>,
            // Share links
            share_links_dtos::CreateShareLinkDto,
            share_links_dtos::ShareLinkDto,
            share_links_dtos::ShareLinkCreatedDto,
            share_links_dtos::SharedDocumentSummaryDto,
            share_links_dtos::SharedDocumentInfoDto,
            ApiResponse<share_links_dtos::ShareLinkCreatedDto>,
            ApiResponse<share_links_dtos::SharedDocumentInfoDto>,
            // Favorites
            favorites_dtos::AddFavoriteDto,
            favorites_dtos::FavoriteResponseDto,
            ApiResponse<favorites_dtos::FavoriteResponseDto>,
            ApiResponse<Vec<favorites_dtos::FavoriteResponseDto>>,
            // Notifications
            notifications_dtos::NotificationResponseDto,
            notifications_dtos::NotificationStatus,
            notifications_dtos::UnreadCountDto,
            notifications_dtos::MarkAllReadResponseDto,
            ApiResponse<Vec<notifications_dtos::NotificationResponseDto>>,
            ApiResponse<notifications_dtos::NotificationResponseDto>,
            ApiResponse<notifications_dtos::UnreadCountDto>,
            ApiResponse<notifications_dtos::MarkAllReadResponseDto>,
            // Services
            org_services_dtos::OrgServiceResponseDto,
            org_services_dtos::CreateOrgServiceDto,
            org_services_dtos::UpdateOrgServiceDto,
            org_services_dtos::DestroyGroupDto,
            org_services_dtos::DestroyGroupResponseDto,
            ApiResponse<org_services_dtos::OrgServiceResponseDto>,
            ApiResponse<Vec<org_services_dtos::OrgServiceResponseDto>>,
            ApiResponse<org_services_dtos::DestroyGroupResponseDto>,
            // Statistics
            statistics_dtos::GlobalStatsDto,
            statistics_dtos::ChartDto,
            statistics_dtos::ChartDatasetDto,
            statistics_dtos::StorageBreakdownDto,
            statistics_dtos::ActionPeriod,
            statistics_dtos::RecentActionsDto,
            statistics_dtos::ShareParticipantDto,
            statistics_dtos::ShareHistoryEntryDto,
            statistics_dtos::SharesByUserDto,
            statistics_dtos::SharesByServiceDto,
            statistics_dtos::SharingStatsDto,
            statistics_dtos::FlowNodeDto,
            statistics_dtos::FlowLinkDto,
            statistics_dtos::FlowStatsDto,
            statistics_dtos::FlowGraphDto,
            statistics_dtos::ActiveUserDto,
            statistics_dtos::RecentShareActivityDto,
            statistics_dtos::UsersByServiceDto,
            statistics_dtos::ActiveUsersDto,
            ApiResponse<statistics_dtos::GlobalStatsDto>,
            ApiResponse<statistics_dtos::ChartDto>,
            ApiResponse<statistics_dtos::StorageBreakdownDto>,
            ApiResponse<statistics_dtos::RecentActionsDto>,
            ApiResponse<statistics_dtos::SharingStatsDto>,
            ApiResponse<statistics_dtos::FlowGraphDto>,
            ApiResponse<statistics_dtos::ActiveUsersDto>,
            // Action logs
            action_logs_dtos::LogActionUserDto,
            action_logs_dtos::LogActionResponseDto,
            ApiResponse<action_logs_dtos::LogActionResponseDto>,
            ApiResponse<Vec<action_logs_dtos::LogActionResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and bearer tokens"),
        (name = "documents", description = "Document upload, download, trash and recents"),
        (name = "search", description = "Document search and filter options"),
        (name = "shares", description = "Sharing documents with users and services"),
        (name = "share-links", description = "Public share links (access code optional)"),
        (name = "favorites", description = "Per-user document bookmarks"),
        (name = "notifications", description = "In-app notifications"),
        (name = "services", description = "Organizational services"),
        (name = "users", description = "User administration (admin only)"),
        (name = "statistics", description = "Dashboards and charts (admin only)"),
        (name = "log-actions", description = "Audit trail (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "DocVault API",
        version = "0.1.0",
        description = "API documentation for DocVault",
    )
)]
pub struct ApiDoc;

/// Adds the bearer token security scheme to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("opaque")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_feature_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/auth/login"));
        assert!(paths.contains_key("/api/documents/search"));
        assert!(paths.contains_key("/api/shared-documents/{token}"));
        assert!(paths.contains_key("/api/statistiques/globales"));

        let schemes = doc
            .components
            .as_ref()
            .map(|c| c.security_schemes.contains_key("bearer_auth"))
            .unwrap_or(false);
        assert!(schemes);
    }

    #[test]
    fn test_swagger_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Custom".to_string(),
            version: "9.9.9".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Custom");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
