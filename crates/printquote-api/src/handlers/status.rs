//! Status polling handler.

use axum::Json;
use axum::extract::{Path, State};

use printquote_core::error::AppError;
use printquote_core::types::JobId;
use printquote_service::StatusView;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /status/{job_id}
///
/// Malformed ids are reported exactly like unknown ones.
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<StatusView>, ApiError> {
    let id: JobId = job_id
        .parse()
        .map_err(|_| AppError::not_found("Job not found"))?;
    Ok(Json(state.query.get(id).await?))
}
