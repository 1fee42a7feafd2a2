//! Quote submission handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use printquote_core::error::AppError;
use printquote_entity::job::JobSubmission;

use crate::dto::QueuedResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /quote
pub async fn submit_quote(
    State(state): State<AppState>,
    body: Result<Json<JobSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    let Json(submission) =
        body.map_err(|e| AppError::validation(format!("Invalid request body: {}", e.body_text())))?;
    let job_id = state.admission.admit(submission).await?;
    Ok((StatusCode::ACCEPTED, Json(QueuedResponse::new(job_id))))
}
