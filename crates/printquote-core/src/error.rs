//! Error type shared by every PrintQuote crate.
//!
//! Crate-local errors (toolchain, worker stages, Redis) convert into
//! [`AppError`] at crate boundaries; the API layer maps [`ErrorKind`] to an
//! HTTP status.

use std::fmt;
use thiserror::Error;

/// Category of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Submission fields are missing or malformed.
    Validation,
    /// Unknown or expired job id.
    NotFound,
    /// The queue broker did not accept an append.
    Enqueue,
    /// Blob storage failed.
    Storage,
    /// The status/result store failed.
    Store,
    /// A status transition was refused.
    Conflict,
    /// A pipeline stage failed.
    Processing,
    /// A computation exceeded its deadline.
    Timeout,
    Configuration,
    Serialization,
    /// A collaborator other than storage or the store failed.
    ExternalService,
    ServiceUnavailable,
    Internal,
}

impl ErrorKind {
    /// Upper-case code used in logs and `Display`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::NotFound => "NOT_FOUND",
            Self::Enqueue => "ENQUEUE",
            Self::Storage => "STORAGE",
            Self::Store => "STORE",
            Self::Conflict => "CONFLICT",
            Self::Processing => "PROCESSING",
            Self::Timeout => "TIMEOUT",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::ExternalService => "EXTERNAL_SERVICE",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Internal => "INTERNAL",
        }
    }

    /// Kinds whose message may be returned to API clients as is.
    pub fn is_client_facing(self) -> bool {
        matches!(self, Self::Validation | Self::NotFound | Self::Conflict)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error carried through `?` across crate boundaries.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

macro_rules! kind_constructors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            #[doc = concat!("An [`ErrorKind::", stringify!($kind), "`] error.")]
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorKind::$kind, message)
            }
        )*
    };
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Like [`AppError::new`], keeping `source` as the cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    kind_constructors! {
        validation => Validation,
        not_found => NotFound,
        enqueue => Enqueue,
        storage => Storage,
        store => Store,
        conflict => Conflict,
        processing => Processing,
        timeout => Timeout,
        configuration => Configuration,
        external_service => ExternalService,
        service_unavailable => ServiceUnavailable,
        internal => Internal,
    }

    /// Whether the message is safe to show to API clients verbatim.
    pub fn is_client_facing(&self) -> bool {
        self.kind.is_client_facing()
    }
}

// The boxed source is not `Clone`; clones keep kind and message only.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self::new(self.kind, self.message.clone())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        let message = format!("Malformed JSON document: {err}");
        Self::with_source(ErrorKind::Serialization, message, err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let message = format!("Filesystem error: {err}");
        Self::with_source(ErrorKind::Internal, message, err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        let message = format!("Cannot load configuration: {err}");
        Self::with_source(ErrorKind::Configuration, message, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::validation("infill is required");
        assert_eq!(err.to_string(), "VALIDATION: infill is required");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("disk gone");
        let err: AppError = io.into();
        assert!(err.source.is_some());
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.kind, ErrorKind::Internal);
    }

    #[test]
    fn test_client_facing_kinds() {
        assert!(AppError::not_found("x").is_client_facing());
        assert!(AppError::conflict("already completed").is_client_facing());
        assert!(!AppError::store("redis down").is_client_facing());
    }
}
