//! Multipart upload handler.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use bytes::Bytes;

use printquote_core::error::AppError;
use printquote_service::UploadFields;

use crate::dto::QueuedResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /upload
///
/// Expects a `file` part plus optional `material`, `infill`, `layer_height`
/// and `rush` text fields.
pub async fn upload_and_quote(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut fields = UploadFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.stl").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read file: {e}")))?;
                file = Some((filename, data));
            }
            "material" => fields.material = Some(read_text(field).await?),
            "infill" => fields.infill = Some(parse_field(&name, &read_text(field).await?)?),
            "layer_height" => {
                fields.layer_height = Some(parse_field(&name, &read_text(field).await?)?)
            }
            "rush" => fields.rush = Some(parse_bool(&read_text(field).await?)?),
            _ => {}
        }
    }

    let (filename, data) = file.ok_or_else(|| AppError::validation("file is required"))?;
    if data.is_empty() {
        return Err(AppError::validation("Uploaded file is empty").into());
    }

    let job_id = state
        .admission
        .admit_upload(state.blobs.as_ref(), &filename, data, fields)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(QueuedResponse::new(job_id))))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|t| t.trim().to_string())
        .map_err(|e| AppError::validation(format!("Malformed form field: {e}")))
}

fn parse_field<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("{name} must be a number")))
}

fn parse_bool(raw: &str) -> Result<bool, AppError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(AppError::validation("rush must be a boolean")),
    }
}
