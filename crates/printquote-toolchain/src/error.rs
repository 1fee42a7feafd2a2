//! Toolchain error types.

use printquote_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Errors raised while driving the geometry toolchain.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// The input file does not exist or is empty.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The input extension is not accepted.
    #[error("Unsupported format {extension}. Supported: {supported}")]
    UnsupportedFormat {
        /// Offending extension (with dot, lowercase) or empty.
        extension: String,
        /// Accepted extensions, comma separated.
        supported: String,
    },

    /// The external program could not be found.
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// The external program exceeded its deadline and was killed.
    #[error("{program} timed out after {seconds} seconds")]
    Timeout {
        /// Program that was killed.
        program: String,
        /// Deadline that was exceeded.
        seconds: u64,
    },

    /// The external program exited unsuccessfully.
    #[error("{program} failed with exit code {code}: {stderr}")]
    ProcessFailed {
        /// Program that failed.
        program: String,
        /// Exit code, -1 when killed by a signal.
        code: i32,
        /// Truncated standard error.
        stderr: String,
    },

    /// The external program succeeded but its output file is missing or empty.
    #[error("Expected output not produced: {0}")]
    OutputMissing(String),

    /// The STL file could not be parsed.
    #[error("Mesh could not be read: {0}")]
    MeshParse(String),

    /// The mesh is not printable.
    #[error("Mesh validation failed: {}", .0.join(", "))]
    MeshInvalid(Vec<String>),

    /// The slicer output lacks required fields.
    #[error("Slicer output incomplete: {0}")]
    GcodeIncomplete(String),

    /// IO error while preparing or reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolchainError {
    /// Whether this error is a deadline kill.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<ToolchainError> for AppError {
    fn from(err: ToolchainError) -> Self {
        let kind = match &err {
            ToolchainError::Timeout { .. } => ErrorKind::Timeout,
            ToolchainError::InvalidInput(_) | ToolchainError::UnsupportedFormat { .. } => {
                ErrorKind::Validation
            }
            _ => ErrorKind::Processing,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_invalid_lists_issues() {
        let err = ToolchainError::MeshInvalid(vec![
            "inconsistent winding".to_string(),
            "not watertight".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Mesh validation failed: inconsistent winding, not watertight"
        );
    }

    #[test]
    fn test_timeout_maps_to_timeout_kind() {
        let err = ToolchainError::Timeout {
            program: "prusaslicer".to_string(),
            seconds: 300,
        };
        assert!(err.is_timeout());
        let app: AppError = err.into();
        assert_eq!(app.kind, ErrorKind::Timeout);
    }
}
