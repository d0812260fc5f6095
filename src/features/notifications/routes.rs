use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::features::notifications::handlers;
use crate::features::notifications::services::NotificationService;

pub fn routes(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route("/api/notifications", get(handlers::list_notifications))
        .route(
            "/api/notifications/unread-count",
            get(handlers::unread_count),
        )
        .route(
            "/api/notifications/mark-all-read",
            post(handlers::mark_all_read),
        )
        .route("/api/notifications/{id}/read", patch(handlers::mark_read))
        .route(
            "/api/notifications/{id}",
            delete(handlers::delete_notification),
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
        routes(Arc::new(NotificationService::new(lazy_pool())))
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/notifications/unread-count")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        server
            .get("/api/notifications")
            .add_query_param("status", "archived")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
