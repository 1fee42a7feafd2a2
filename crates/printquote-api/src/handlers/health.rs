//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::{BackendHealth, HealthResponse, RootResponse};
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "3D Printing Quotation Engine API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.stores.store();
    let broker = state.stores.broker();

    let store_health = BackendHealth {
        provider: store.provider_type().to_string(),
        healthy: store.health_check().await.unwrap_or(false),
    };
    let queue_health = BackendHealth {
        provider: broker.provider_type().to_string(),
        healthy: broker.health_check().await.unwrap_or(false),
    };

    let healthy = store_health.healthy && queue_health.healthy;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            service: "quotation-engine".to_string(),
            store: store_health,
            queue: queue_health,
        }),
    )
}
