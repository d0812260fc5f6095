use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::features::documents::handlers;
use crate::features::documents::services::DocumentService;
use crate::shared::constants::MAX_FILE_SIZE;

/// Multipart overhead tolerated on top of the file itself
const UPLOAD_BODY_SLACK: usize = 1024 * 1024;

pub fn routes(service: Arc<DocumentService>) -> Router {
    Router::new()
        .route(
            "/api/documents",
            get(handlers::list_documents)
                .post(handlers::upload_document)
                .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + UPLOAD_BODY_SLACK)),
        )
        .route("/api/documents/trash", get(handlers::list_trash))
        .route("/api/documents/recent", get(handlers::recent_documents))
        .route(
            "/api/documents/recent/search",
            get(handlers::search_recent_documents),
        )
        .route(
            "/api/documents/{uuid}",
            get(handlers::get_document)
                .put(handlers::update_document)
                .post(handlers::update_document)
                .delete(handlers::trash_document),
        )
        .route(
            "/api/documents/{uuid}/restore",
            post(handlers::restore_document),
        )
        .route(
            "/api/documents/{uuid}/force",
            delete(handlers::force_delete_document),
        )
        .route(
            "/api/documents/{uuid}/preview",
            get(handlers::preview_document),
        )
        .route(
            "/api/documents/{uuid}/download",
            get(handlers::download_document),
        )
        .route(
            "/api/documents/{uuid}/send-email",
            post(handlers::send_document_email),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::access::AccessService;
    use crate::features::action_logs::ActionLogger;
    use crate::modules::mail::Mailer;
    use crate::modules::storage::{LocalDiskStorage, SharedStorage};
    use crate::shared::test_helpers::{lazy_pool, with_user_auth};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::json;

    async fn router(root: &std::path::Path) -> Router {
        let pool = lazy_pool();
        let storage: SharedStorage = Arc::new(LocalDiskStorage::new(root.to_path_buf()).await.unwrap());
        routes(Arc::new(DocumentService::new(
            pool.clone(),
            Arc::new(AccessService::new(pool.clone())),
            storage,
            Arc::new(Mailer::log_only("Docvault <no-reply@example.com>").unwrap()),
            Arc::new(ActionLogger::new(pool)),
        )))
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(router(dir.path()).await).unwrap();

        server
            .get("/api/documents")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/documents/trash")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(with_user_auth(router(dir.path()).await)).unwrap();

        let form = MultipartForm::new().add_text("description", "Sans fichier");
        let response = server.post("/api/documents").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "fichier is required");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_numeric_service() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(with_user_auth(router(dir.path()).await)).unwrap();

        let form = MultipartForm::new()
            .add_text("service_id", "finance")
            .add_part(
                "fichier",
                Part::bytes(b"%PDF-1.4".to_vec())
                    .file_name("rapport.pdf")
                    .mime_type("application/pdf"),
            );
        let response = server.post("/api/documents").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        // Nothing reached the storage root
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_uuid_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(with_user_auth(router(dir.path()).await)).unwrap();

        let response = server.get("/api/documents/not-a-uuid").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_send_email_validates_body() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(with_user_auth(router(dir.path()).await)).unwrap();

        let response = server
            .post("/api/documents/0b7f6a4e-8f0a-4a57-9a53-7f4c1b1e2d3c/send-email")
            .json(&json!({"recipient_email": "nope", "subject": "Rapport", "body": "Bonjour"}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
