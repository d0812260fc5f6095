use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::share_links::handlers;
use crate::features::share_links::services::ShareLinkService;

/// Link creation, behind the bearer token middleware
pub fn protected_routes(service: Arc<ShareLinkService>) -> Router {
    Router::new()
        .route(
            "/api/documents/{uuid}/share-link",
            post(handlers::create_share_link),
        )
        .with_state(service)
}

/// Link access, reachable anonymously; mount behind the optional auth middleware so
/// `require_login` links can see a signed-in caller
pub fn public_routes(service: Arc<ShareLinkService>) -> Router {
    Router::new()
        .route(
            "/api/shared-documents/{token}/info",
            get(handlers::shared_document_info),
        )
        .route(
            "/api/shared-documents/{token}",
            get(handlers::access_shared_document),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::access::AccessService;
    use crate::features::action_logs::ActionLogger;
    use crate::modules::storage::{LocalDiskStorage, SharedStorage};
    use crate::shared::test_helpers::{lazy_pool, with_user_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    async fn service(root: &std::path::Path) -> Arc<ShareLinkService> {
        let pool = lazy_pool();
        let storage: SharedStorage =
            Arc::new(LocalDiskStorage::new(root.to_path_buf()).await.unwrap());
        Arc::new(ShareLinkService::new(
            pool.clone(),
            Arc::new(AccessService::new(pool.clone())),
            storage,
            Arc::new(ActionLogger::new(pool)),
            "http://localhost:3000".to_string(),
        ))
    }

    #[tokio::test]
    async fn test_create_requires_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(protected_routes(service(dir.path()).await)).unwrap();

        server
            .post("/api/documents/0b7f6a4e-8f0a-4a57-9a53-7f4c1b1e2d3c/share-link")
            .json(&json!({"permission_level": "read"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_code() {
        let dir = tempfile::tempdir().unwrap();
        let server =
            TestServer::new(with_user_auth(protected_routes(service(dir.path()).await))).unwrap();

        let response = server
            .post("/api/documents/0b7f6a4e-8f0a-4a57-9a53-7f4c1b1e2d3c/share-link")
            .json(&json!({"permission_level": "read", "require_code": true, "access_code": "12ab"}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
