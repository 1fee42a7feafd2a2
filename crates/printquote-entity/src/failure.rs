//! Structured failure reasons recorded for `failed` jobs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which pipeline stage a job failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The input file could not be downloaded.
    Download,
    /// The input extension is not accepted.
    UnsupportedFormat,
    /// STEP to STL conversion failed.
    Conversion,
    /// The mesh is not watertight, inconsistently wound, or has no volume.
    MeshInvalid,
    /// The orientation tool failed.
    Orientation,
    /// The slicer failed or produced unusable output.
    Slicing,
    /// A deadline was exceeded and the work was killed.
    Timeout,
    /// Anything else, including worker panics.
    Internal,
}

impl FailureKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::UnsupportedFormat => "unsupported_format",
            Self::Conversion => "conversion",
            Self::MeshInvalid => "mesh_invalid",
            Self::Orientation => "orientation",
            Self::Slicing => "slicing",
            Self::Timeout => "timeout",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Client-facing failure reason stored under `failure:{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    /// Failure classification.
    pub kind: FailureKind,
    /// Short description safe to show to clients.
    pub message: String,
}

impl FailureReason {
    /// Create a new failure reason.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
