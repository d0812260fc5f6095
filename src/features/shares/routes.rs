use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::shares::handlers;
use crate::features::shares::services::ShareService;

pub fn routes(service: Arc<ShareService>) -> Router {
    Router::new()
        .route(
            "/api/documents/shared-with-me",
            get(handlers::shared_with_me),
        )
        .route(
            "/api/documents/{uuid}/share",
            post(handlers::share_document),
        )
        .route(
            "/api/documents/{uuid}/shares",
            get(handlers::list_document_shares),
        )
        .route(
            "/api/documents/{uuid}/shares/{share_id}",
            delete(handlers::remove_document_share),
        )
        .route(
            "/api/documents/{uuid}/shared-with-me",
            delete(handlers::leave_share),
        )
        .route(
            "/api/documents/{uuid}/share-by-service",
            post(handlers::share_with_service),
        )
        .route("/api/shares/{share_id}", delete(handlers::remove_share))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::access::AccessService;
    use crate::features::action_logs::ActionLogger;
    use crate::shared::test_helpers::{lazy_pool, with_user_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    const DOC: &str = "/api/documents/0b7f6a4e-8f0a-4a57-9a53-7f4c1b1e2d3c";

    fn router() -> Router {
        let pool = lazy_pool();
        routes(Arc::new(ShareService::new(
            pool.clone(),
            Arc::new(AccessService::new(pool.clone())),
            Arc::new(ActionLogger::new(pool)),
        )))
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/documents/shared-with-me")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .delete("/api/shares/1")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_share_rejects_unknown_permission() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        let response = server
            .post(&format!("{}/share", DOC))
            .json(&json!({"email": "b@x.com", "permission_level": "owner"}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_share_rejects_past_expiry() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        let response = server
            .post(&format!("{}/share", DOC))
            .json(&json!({
                "email": "b@x.com",
                "permission_level": "read",
                "expires_at": "2000-01-01T00:00:00Z"
            }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_share_by_service_without_service_id_is_malformed() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        let response = server
            .post(&format!("{}/share-by-service", DOC))
            .json(&json!({"permission_level": "read"}))
            .await;

        // Missing fields are a malformed body, not a validation failure
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
