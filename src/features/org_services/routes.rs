use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::org_services::handlers;
use crate::features::org_services::services::OrgServiceService;

/// Reads are open to every signed-in user; writes require the admin role
pub fn routes(service: Arc<OrgServiceService>) -> Router {
    Router::new()
        .route(
            "/api/services",
            get(handlers::list_services).post(handlers::create_service),
        )
        .route(
            "/api/services/destroy-group",
            post(handlers::destroy_service_group),
        )
        .route(
            "/api/services/{id}",
            get(handlers::get_service)
                .put(handlers::update_service)
                .post(handlers::update_service)
                .delete(handlers::delete_service),
        )
        .route("/api/user/service", get(handlers::get_my_service))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::action_logs::ActionLogger;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth, with_user_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn router() -> Router {
        let pool = lazy_pool();
        routes(Arc::new(OrgServiceService::new(
            pool.clone(),
            Arc::new(ActionLogger::new(pool)),
        )))
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/services")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_regular_user_cannot_create() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        server
            .post("/api/services")
            .json(&json!({"nom": "Juridique"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_regular_user_cannot_destroy_group() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        server
            .post("/api/services/destroy-group")
            .json(&json!({"ids": [1, 2]}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_validates_name() {
        let server = TestServer::new(with_admin_auth(router())).unwrap();
        server
            .post("/api/services")
            .json(&json!({"nom": ""}))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_destroy_group_requires_ids() {
        let server = TestServer::new(with_admin_auth(router())).unwrap();
        server
            .post("/api/services/destroy-group")
            .json(&json!({"ids": []}))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
