use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use faultline_core::actor::MembershipAccess;
use faultline_core::mapping::Mapper;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faultline_api::background::{work_queue::InProcessWorkQueue, worker};
use faultline_api::config::ServerConfig;
use faultline_api::resources;
use faultline_api::router::build_app_router;
use faultline_api::state::{AppState, Repositories};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faultline_api=debug,faultline_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Storage ---
    let (pool, repositories) = match &config.database_url {
        Some(database_url) => {
            let pool = faultline_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            faultline_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            faultline_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let repositories = Repositories::postgres(pool.clone());
            (Some(pool), repositories)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            (None, Repositories::in_memory())
        }
    };

    // --- Mapping rules ---
    let mapper = Mapper::new();
    resources::register_mappings(&mapper);

    // --- Background worker ---
    let (work_queue, receiver) = InProcessWorkQueue::new();
    let worker_cancel = CancellationToken::new();
    let worker_handle = tokio::spawn(worker::run(
        receiver,
        repositories.clone(),
        worker_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        repositories,
        mapper: Arc::new(mapper),
        access: Arc::new(MembershipAccess),
        work_queue: Arc::new(work_queue),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    worker_cancel.cancel();
    if tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        worker_handle,
    )
    .await
    .is_err()
    {
        tracing::warn!("Background worker did not stop before the shutdown timeout");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
