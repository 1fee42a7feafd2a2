//! Submission defaults and validation bounds.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Policy applied by job admission to optional submission fields.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Material used when the submission omits one.
    #[serde(default = "default_material")]
    pub default_material: String,
    /// Layer height (mm) used when the submission omits one.
    #[serde(default = "default_layer_height")]
    pub default_layer_height: f64,
    /// Materials accepted at admission, compared case-insensitively.
    #[serde(default = "default_allowed_materials")]
    #[validate(length(min = 1))]
    pub allowed_materials: Vec<String>,
    /// Smallest accepted layer height (mm).
    #[serde(default = "default_min_layer_height")]
    #[validate(range(exclusive_min = 0.0))]
    pub min_layer_height: f64,
    /// Largest accepted layer height (mm).
    #[serde(default = "default_max_layer_height")]
    pub max_layer_height: f64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            default_material: default_material(),
            default_layer_height: default_layer_height(),
            allowed_materials: default_allowed_materials(),
            min_layer_height: default_min_layer_height(),
            max_layer_height: default_max_layer_height(),
        }
    }
}

fn default_material() -> String {
    "PLA".to_string()
}

fn default_layer_height() -> f64 {
    0.2
}

fn default_allowed_materials() -> Vec<String> {
    ["PLA", "PETG", "ABS", "TPU"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_min_layer_height() -> f64 {
    0.05
}

fn default_max_layer_height() -> f64 {
    1.0
}
