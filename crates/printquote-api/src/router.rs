//! Route definitions for the PrintQuote HTTP API.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes and the body limit.
///
/// Uploads stored by the local blob provider are served read-only under
/// `/blobs` so workers can fetch them by URL.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_bytes;

    let mut router = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .route("/quote", post(handlers::quote::submit_quote))
        .route("/upload", post(handlers::upload::upload_and_quote))
        .route("/status/{job_id}", get(handlers::status::get_status));

    if state.config.blob.provider == "local" {
        router = router.nest_service("/blobs", ServeDir::new(&state.config.blob.local.root));
    }

    router
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(axum_middleware::from_fn(
            crate::middleware::logging::request_logging,
        ))
        .with_state(state)
}
