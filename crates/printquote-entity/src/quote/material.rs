//! Print material names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Density used for materials without a known entry (PLA).
const DEFAULT_DENSITY: f64 = 1.24;

/// A print material name, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Material(String);

impl Material {
    /// Create a material, trimming and uppercasing the name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_uppercase())
    }

    /// The normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filament density in g/cm³.
    pub fn density(&self) -> f64 {
        match self.0.as_str() {
            "PLA" => 1.24,
            "PETG" => 1.27,
            "ABS" => 1.04,
            "TPU" => 1.20,
            _ => DEFAULT_DENSITY,
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
