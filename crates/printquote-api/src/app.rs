//! Application builder and server entry point.

use std::sync::Arc;

use axum::Router;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use printquote_core::config::AppConfig;
use printquote_core::error::AppError;
use printquote_store::StoreManager;
use printquote_toolchain::ExternalToolchain;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the API server until Ctrl+C.
///
/// With `embedded_workers > 0`, that many worker loops run in the same
/// process against the same backends, which is the only way the memory
/// backend reaches a worker.
pub async fn run_server(config: AppConfig, embedded_workers: usize) -> Result<(), AppError> {
    tracing::info!("Starting PrintQuote API v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        "Initializing store and queue (provider: {})...",
        config.store.provider
    );
    let stores = StoreManager::new(&config.store, &config.queue).await?;
    stores.ensure_reachable().await?;

    tracing::info!("Initializing blob storage (provider: {})...", config.blob.provider);
    let blobs = printquote_storage::manager::build_blob_storage(&config.blob).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let workers = if embedded_workers > 0 {
        tokio::fs::create_dir_all(&config.worker.temp_dir)
            .await
            .map_err(|e| {
                AppError::internal(format!(
                    "Failed to create temp dir '{}': {e}",
                    config.worker.temp_dir
                ))
            })?;
        let mut worker_config = config.clone();
        worker_config.worker.instances = embedded_workers;
        let toolchain = Arc::new(ExternalToolchain::new(config.toolchain.clone()));
        Some(printquote_worker::spawn_pool(
            &worker_config,
            &stores,
            toolchain,
            shutdown_rx.clone(),
        )?)
    } else {
        None
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_app(AppState::new(config, stores, blobs));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("PrintQuote API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(mut workers) = workers {
        tracing::info!("Waiting for embedded workers to finish...");
        while workers.join_next().await.is_some() {}
    }
    Ok(())
}

/// Resolves on Ctrl+C (and SIGTERM on unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received");
}
