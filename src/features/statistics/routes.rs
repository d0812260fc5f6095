use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::statistics::handlers;
use crate::features::statistics::services::StatisticsService;

/// Admin dashboard aggregations
pub fn routes(service: Arc<StatisticsService>) -> Router {
    Router::new()
        .route("/api/statistiques/globales", get(handlers::global_stats))
        .route(
            "/api/statistiques/activite-documents",
            get(handlers::document_activity),
        )
        .route(
            "/api/statistiques/repartition-stockage",
            get(handlers::storage_breakdown),
        )
        .route(
            "/api/statistiques/activite-utilisateurs",
            get(handlers::user_activity),
        )
        .route(
            "/api/statistiques/actions-recentes",
            get(handlers::recent_actions),
        )
        .route(
            "/api/statistiques/actions-utilisateurs",
            get(handlers::user_actions_chart),
        )
        .route(
            "/api/statistiques/partages-documents",
            get(handlers::sharing_stats),
        )
        .route(
            "/api/statistiques/flux-documents",
            get(handlers::document_flow),
        )
        .route(
            "/api/statistiques/utilisateurs-actifs",
            get(handlers::active_users),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth, with_user_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn router() -> Router {
        routes(Arc::new(StatisticsService::new(lazy_pool())))
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/statistiques/globales")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_regular_user_is_forbidden() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        for path in [
            "/api/statistiques/globales",
            "/api/statistiques/flux-documents",
            "/api/statistiques/utilisateurs-actifs",
        ] {
            server.get(path).await.assert_status(StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn test_recent_actions_rejects_unknown_period() {
        let server = TestServer::new(with_admin_auth(router())).unwrap();
        server
            .get("/api/statistiques/actions-recentes")
            .add_query_param("period", "decade")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
