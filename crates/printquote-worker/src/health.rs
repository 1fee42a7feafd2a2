//! Optional liveness listener for worker processes.

use std::net::SocketAddr;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::watch;

use printquote_core::error::AppError;
use printquote_core::result::AppResult;

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "quotation-worker",
    }))
}

/// Router answering `GET /health`.
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Serve the liveness endpoint on `0.0.0.0:port` until `cancel` turns true.
pub async fn serve(port: u16, mut cancel: watch::Receiver<bool>) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::configuration(format!("Cannot bind worker health port {addr}: {e}")))?;
    tracing::info!("Worker health endpoint listening on {}", addr);

    axum::serve(listener, router())
        .with_graceful_shutdown(async move {
            while !*cancel.borrow() {
                if cancel.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Worker health endpoint failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_body() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "quotation-worker");
    }
}
