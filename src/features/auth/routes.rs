use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .with_state(service)
}

/// Protected auth routes (require a bearer token)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/me", get(handlers::get_me))
        .route("/api/auth/logout", post(handlers::logout))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::action_logs::ActionLogger;
    use crate::features::auth::services::TokenService;
    use crate::modules::mail::Mailer;
    use crate::shared::test_helpers::lazy_pool;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn service() -> Arc<AuthService> {
        let pool = lazy_pool();
        Arc::new(AuthService::new(
            pool.clone(),
            Arc::new(TokenService::new(pool.clone(), None)),
            Arc::new(Mailer::log_only("Docvault <no-reply@example.com>").unwrap()),
            Arc::new(ActionLogger::new(pool)),
            4,
            "http://localhost:3000".to_string(),
        ))
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let server = TestServer::new(public_routes(service())).unwrap();

        let response = server
            .post("/api/auth/register")
            .json(&json!({"nom": "Kouassi", "prenom": "Awa", "email": "nope"}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_json() {
        let server = TestServer::new(public_routes(service())).unwrap();

        let response = server
            .post("/api/auth/login")
            .bytes("{not json".as_bytes().to_vec().into())
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_requires_authenticated_user() {
        let server = TestServer::new(protected_routes(service())).unwrap();
        server
            .get("/api/auth/me")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
