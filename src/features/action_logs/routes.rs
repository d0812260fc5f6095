use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::action_logs::handlers;
use crate::features::action_logs::services::ActionLogService;

/// Admin-only audit trail routes
pub fn routes(service: Arc<ActionLogService>) -> Router {
    Router::new()
        .route("/api/log-actions", get(handlers::list_action_logs))
        .route("/api/log-actions/{id}", get(handlers::get_action_log))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, with_user_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn router() -> Router {
        routes(Arc::new(ActionLogService::new(lazy_pool())))
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        let response = server.get("/api/log-actions").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_regular_user_is_forbidden() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        let response = server.get("/api/log-actions/1").await;
        response.assert_status(StatusCode::FORBIDDEN);
    }
}
