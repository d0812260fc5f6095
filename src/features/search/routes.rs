use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::search::handlers;
use crate::features::search::services::SearchService;

pub fn routes(service: Arc<SearchService>) -> Router {
    Router::new()
        .route("/api/documents/search", get(handlers::search_documents))
        .route(
            "/api/documents/filters/options",
            get(handlers::filter_options),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, with_user_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn router() -> Router {
        routes(Arc::new(SearchService::new(lazy_pool())))
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/documents/search")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_unknown_sort_column() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        server
            .get("/api/documents/search")
            .add_query_param("sort_by", "chemin")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_rejects_oversized_page() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        server
            .get("/api/documents/search")
            .add_query_param("per_page", "500")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_rejects_malformed_date() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        server
            .get("/api/documents/search")
            .add_query_param("date_from", "yesterday")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
