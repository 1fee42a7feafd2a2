//! Pipeline stage errors.

use printquote_core::error::AppError;
use printquote_entity::failure::{FailureKind, FailureReason};
use printquote_toolchain::ToolchainError;

/// A pipeline stage failed. Always recorded as a terminal `failed` status.
///
/// `message` is shown to clients; `detail` is only logged.
#[derive(Debug, thiserror::Error)]
#[error("{kind} failure: {message}")]
pub struct StageError {
    /// Failure classification.
    pub kind: FailureKind,
    /// Client-safe description.
    pub message: String,
    /// Full internal description.
    pub detail: String,
}

impl StageError {
    /// Create an error whose message is safe to show as is.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            detail: message.clone(),
            message,
        }
    }

    /// Create an error with a public message and a separate internal detail.
    pub fn with_detail(
        kind: FailureKind,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// Classify a toolchain error raised during `stage`.
    ///
    /// Deadline kills become `timeout` whatever the stage.
    pub fn from_toolchain(stage: FailureKind, err: ToolchainError) -> Self {
        let detail = err.to_string();
        match err {
            ToolchainError::Timeout { seconds, .. } => Self::with_detail(
                FailureKind::Timeout,
                format!("Processing exceeded the {seconds} second limit"),
                detail,
            ),
            ToolchainError::UnsupportedFormat { .. }
            | ToolchainError::InvalidInput(_)
            | ToolchainError::MeshInvalid(_)
            | ToolchainError::MeshParse(_) => Self::with_detail(stage, detail.clone(), detail),
            _ => Self::with_detail(stage, format!("{} stage failed", stage_label(stage)), detail),
        }
    }

    /// The reason stored for polling clients.
    pub fn to_reason(&self) -> FailureReason {
        FailureReason::new(self.kind, self.message.clone())
    }
}

impl From<StageError> for AppError {
    fn from(err: StageError) -> Self {
        match err.kind {
            FailureKind::Timeout => AppError::timeout(err.message),
            _ => AppError::processing(format!("{}: {}", err.kind, err.message)),
        }
    }
}

fn stage_label(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Download => "Download",
        FailureKind::UnsupportedFormat => "Input check",
        FailureKind::Conversion => "Conversion",
        FailureKind::MeshInvalid => "Mesh validation",
        FailureKind::Orientation => "Orientation",
        FailureKind::Slicing => "Slicing",
        FailureKind::Timeout => "Timeout",
        FailureKind::Internal => "Internal",
    }
}
