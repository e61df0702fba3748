//! Turnstile reservation engine HTTP server.
//!
//! Stateless checkout orchestrator over the Redis hold store and the
//! Postgres inventory record store.

use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turnstile_core::{ReservationManager, SystemClock};
use turnstile_postgres::PostgresInventoryStore;
use turnstile_redis::RedisHoldStore;
use turnstile_web::{build_router, AppState, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Turnstile reservation engine");
    info!(
        postgres_url = %config.postgres.url,
        redis_url = %config.redis.url,
        default_ttl_secs = config.holds.default_ttl_secs,
        "Configuration loaded"
    );

    info!("Connecting to inventory record store...");
    let inventory =
        PostgresInventoryStore::connect(&config.postgres.url, config.postgres.max_connections)
            .await?;
    inventory.migrate().await?;
    info!("Inventory record store ready");

    // Redis connections are established lazily on first use.
    let holds = RedisHoldStore::new(&config.redis.url)?;
    info!("Hold store client ready");

    let manager = Arc::new(ReservationManager::new(
        Arc::new(holds),
        Arc::new(inventory),
        Arc::new(SystemClock),
        config.holds.policy(),
    ));
    let app = build_router(AppState::new(manager));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
