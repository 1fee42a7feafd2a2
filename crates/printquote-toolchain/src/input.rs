//! Input file checks.

use std::path::Path;

use crate::error::ToolchainError;

/// Kind of model file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Triangle mesh, sliced directly.
    Stl,
    /// CAD solid, converted to STL first.
    Step,
}

impl InputFormat {
    /// Whether the slicer needs a converted STL first.
    pub fn needs_conversion(&self) -> bool {
        matches!(self, Self::Step)
    }
}

/// Lowercase extension of `path` without the dot, empty when absent.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Check that `path` exists, is non-empty and has an accepted extension.
pub async fn check_input(path: &Path, supported: &[String]) -> Result<InputFormat, ToolchainError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolchainError::InvalidInput("File not found".to_string()));
        }
        Err(e) => return Err(ToolchainError::Io(e)),
    };

    let ext = extension_of(path);
    let accepted = supported.iter().any(|s| s.eq_ignore_ascii_case(&ext));
    let format = match ext.as_str() {
        "stl" if accepted => InputFormat::Stl,
        "step" | "stp" if accepted => InputFormat::Step,
        _ => {
            return Err(ToolchainError::UnsupportedFormat {
                extension: if ext.is_empty() {
                    String::new()
                } else {
                    format!(".{ext}")
                },
                supported: supported
                    .iter()
                    .map(|s| format!(".{s}"))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
    };

    if metadata.len() == 0 {
        return Err(ToolchainError::InvalidInput("File is empty".to_string()));
    }
    Ok(format)
}
