use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::features::favorites::handlers;
use crate::features::favorites::services::FavoriteService;

pub fn routes(service: Arc<FavoriteService>) -> Router {
    Router::new()
        .route(
            "/api/favoris",
            get(handlers::list_favorites).post(handlers::add_favorite),
        )
        .route("/api/favoris/{uuid}", delete(handlers::remove_favorite))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::access::AccessService;
    use crate::shared::test_helpers::{lazy_pool, with_user_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn router() -> Router {
        let pool = lazy_pool();
        routes(Arc::new(FavoriteService::new(
            pool.clone(),
            Arc::new(AccessService::new(pool)),
        )))
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/favoris")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_add_rejects_malformed_uuid() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        server
            .post("/api/favoris")
            .json(&json!({"document_uuid": "not-a-uuid"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remove_rejects_malformed_uuid() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        server
            .delete("/api/favoris/42")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
