use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::UserService;

/// Admin-only account management
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::freeze_user),
        )
        .route("/api/users/{id}/unfreeze", patch(handlers::unfreeze_user))
        .route(
            "/api/users/{id}/reset-password",
            patch(handlers::reset_password),
        )
        .route("/api/users/{id}/assign-role", patch(handlers::assign_role))
        .route(
            "/api/users/{id}/assign-service",
            patch(handlers::assign_service),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::action_logs::ActionLogger;
    use crate::shared::test_helpers::{
        lazy_pool, with_admin_auth, with_user_auth, TEST_ADMIN_ID,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn router() -> Router {
        let pool = lazy_pool();
        routes(Arc::new(UserService::new(
            pool.clone(),
            Arc::new(ActionLogger::new(pool)),
            4,
        )))
    }

    #[tokio::test]
    async fn test_regular_user_is_forbidden() {
        let server = TestServer::new(with_user_auth(router())).unwrap();
        server
            .get("/api/users")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_cannot_freeze_self() {
        let server = TestServer::new(with_admin_auth(router())).unwrap();
        server
            .delete(&format!("/api/users/{}", TEST_ADMIN_ID))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_self() {
        let server = TestServer::new(with_admin_auth(router())).unwrap();
        server
            .patch(&format!("/api/users/{}/assign-role", TEST_ADMIN_ID))
            .json(&json!({"role": 0}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assign_role_validates_value() {
        let server = TestServer::new(with_admin_auth(router())).unwrap();
        server
            .patch("/api/users/5/assign-role")
            .json(&json!({"role": 7}))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_reset_password_requires_confirmation() {
        let server = TestServer::new(with_admin_auth(router())).unwrap();
        server
            .patch("/api/users/5/reset-password")
            .json(&json!({"password": "newpassword", "password_confirmation": "different"}))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_rejects_short_password() {
        let server = TestServer::new(with_admin_auth(router())).unwrap();
        server
            .post("/api/users")
            .json(&json!({"name": "awa", "email": "awa@example.com", "password": "short"}))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
