mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::access::AccessService;
use crate::features::action_logs::{routes as action_logs_routes, ActionLogService, ActionLogger};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::{AuthService, TokenService};
use crate::features::documents::{routes as documents_routes, DocumentService};
use crate::features::favorites::{routes as favorites_routes, FavoriteService};
use crate::features::notifications::{routes as notifications_routes, NotificationService};
use crate::features::org_services::{routes as org_services_routes, OrgServiceService};
use crate::features::search::{routes as search_routes, SearchService};
use crate::features::share_links::{routes as share_links_routes, ShareLinkService};
use crate::features::shares::{routes as shares_routes, ShareService};
use crate::features::statistics::{routes as statistics_routes, StatisticsService};
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::mail::Mailer;
use crate::modules::storage::{build_storage, StorageBackend};
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Infrastructure
    let storage = build_storage(&config.storage, &config.minio)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize document storage: {}", e))?;
    tracing::info!("Document storage initialized ({})", storage.driver());

    let mailer = Arc::new(
        Mailer::new(&config.mail)
            .map_err(|e| anyhow::anyhow!("Failed to initialize mailer: {}", e))?,
    );

    // Shared services
    let token_service = Arc::new(TokenService::new(pool.clone(), config.auth.token_ttl));
    let action_logger = Arc::new(ActionLogger::new(pool.clone()));
    let access_service = Arc::new(AccessService::new(pool.clone()));

    let auth_service = Arc::new(AuthService::new(
        pool.clone(),
        Arc::clone(&token_service),
        Arc::clone(&mailer),
        Arc::clone(&action_logger),
        config.auth.bcrypt_cost,
        config.app.frontend_url.clone(),
    ));
    tracing::info!("Auth services initialized");

    if let (Some(email), Some(password)) = (
        config.auth.bootstrap_admin_email.as_deref(),
        config.auth.bootstrap_admin_password.as_deref(),
    ) {
        let created = auth_service
            .ensure_bootstrap_admin(email, password)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bootstrap admin account: {}", e))?;
        if created {
            tracing::info!("Bootstrap admin account created for {}", email);
        }
    }

    // Feature services
    let document_service = Arc::new(DocumentService::new(
        pool.clone(),
        Arc::clone(&access_service),
        storage.clone(),
        Arc::clone(&mailer),
        Arc::clone(&action_logger),
    ));
    let search_service = Arc::new(SearchService::new(pool.clone()));
    let share_service = Arc::new(ShareService::new(
        pool.clone(),
        Arc::clone(&access_service),
        Arc::clone(&action_logger),
    ));
    let share_link_service = Arc::new(ShareLinkService::new(
        pool.clone(),
        Arc::clone(&access_service),
        storage.clone(),
        Arc::clone(&action_logger),
        config.app.frontend_url.clone(),
    ));
    let favorite_service = Arc::new(FavoriteService::new(
        pool.clone(),
        Arc::clone(&access_service),
    ));
    let notification_service = Arc::new(NotificationService::new(pool.clone()));
    let org_service_service = Arc::new(OrgServiceService::new(
        pool.clone(),
        Arc::clone(&action_logger),
    ));
    let user_service = Arc::new(UserService::new(
        pool.clone(),
        Arc::clone(&action_logger),
        config.auth.bcrypt_cost,
    ));
    let statistics_service = Arc::new(StatisticsService::new(pool.clone()));
    let action_log_service = Arc::new(ActionLogService::new(pool.clone()));
    tracing::info!("Feature services initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require a valid bearer token)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(search_routes::routes(search_service))
        .merge(documents_routes::routes(document_service))
        .merge(shares_routes::routes(share_service))
        .merge(share_links_routes::protected_routes(Arc::clone(
            &share_link_service,
        )))
        .merge(favorites_routes::routes(favorite_service))
        .merge(notifications_routes::routes(notification_service))
        .merge(org_services_routes::routes(org_service_service))
        .merge(users_routes::routes(user_service))
        .merge(statistics_routes::routes(statistics_service))
        .merge(action_logs_routes::routes(action_log_service))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&token_service),
            middleware::auth_middleware,
        ));

    // Share links answer anonymous callers but still recognize a signed-in user
    let shared_document_routes = share_links_routes::public_routes(share_link_service).route_layer(
        axum::middleware::from_fn_with_state(
            Arc::clone(&token_service),
            middleware::optional_auth_middleware,
        ),
    );

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(auth_service))
        .merge(shared_document_routes);

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    // Connect info feeds the client IP recorded in the audit trail
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
