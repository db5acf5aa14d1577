//! Application builder: wires router + middleware + state into an Axum app,
//! and runs the server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use healthlink_cache::spawn_sweeper;
use healthlink_core::config::AppConfig;
use healthlink_core::error::{AppError, ErrorKind};
use healthlink_database::DatabasePool;
use healthlink_database::migration::run_migrations;
use healthlink_service::HttpTokenClient;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Runs the HealthLink server until Ctrl-C.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting HealthLink v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: OAuth token client ───────────────────────────────
    let token_client = Arc::new(HttpTokenClient::new(&config.endpoints)?);

    // ── Step 3: Repositories, brokers, services ──────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let sweep_interval = config.tickets.sweep_interval();
    let shutdown_grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(config, db.clone(), token_client)?;

    // ── Step 4: Ticket sweeper ───────────────────────────────────
    let sweeper = spawn_sweeper(state.ticket_registries(), sweep_interval);

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app = build_app(state);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;
    tracing::info!(address = %addr, "HealthLink server listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    // Live sessions stay open until their clients leave, so the drain is bounded.
    let drain_deadline = async move {
        if shutdown_rx.wait_for(|stopping| *stopping).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(shutdown_grace).await;
    };

    let result = tokio::select! {
        result = server => result.map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Server error", e)
        }),
        () = drain_deadline => {
            tracing::warn!(
                grace_seconds = shutdown_grace.as_secs(),
                "Shutdown grace elapsed, closing remaining connections"
            );
            Ok(())
        }
    };

    sweeper.abort();
    db.close().await;
    tracing::info!("HealthLink server stopped");
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
