//! Pricing configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Cost model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Base machine rate per print hour.
    #[serde(default = "default_base_rate")]
    pub base_rate_per_hour: f64,
    /// Multiplier per material name. Unknown materials use 1.0.
    #[serde(default = "default_material_multipliers")]
    pub material_multipliers: HashMap<String, f64>,
    /// Multiplier per complexity level (`low`, `medium`, `high`).
    #[serde(default = "default_complexity_multipliers")]
    pub complexity_multipliers: HashMap<String, f64>,
    /// Multiplier applied to rush orders.
    #[serde(default = "default_rush_multiplier")]
    pub rush_multiplier: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_rate_per_hour: default_base_rate(),
            material_multipliers: default_material_multipliers(),
            complexity_multipliers: default_complexity_multipliers(),
            rush_multiplier: default_rush_multiplier(),
        }
    }
}

impl PricingConfig {
    /// Multiplier for a material, 1.0 when unlisted.
    pub fn material_multiplier(&self, material: &str) -> f64 {
        lookup(&self.material_multipliers, material)
    }

    /// Multiplier for a complexity level, 1.0 when unlisted.
    pub fn complexity_multiplier(&self, level: &str) -> f64 {
        lookup(&self.complexity_multipliers, level)
    }
}

// Config sources may fold key case, so match names case-insensitively.
fn lookup(table: &HashMap<String, f64>, name: &str) -> f64 {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| *value)
        .unwrap_or(1.0)
}

fn default_base_rate() -> f64 {
    3.0
}

fn default_material_multipliers() -> HashMap<String, f64> {
    HashMap::from([
        ("PLA".to_string(), 0.8),
        ("PETG".to_string(), 1.0),
        ("ABS".to_string(), 1.2),
    ])
}

fn default_complexity_multipliers() -> HashMap<String, f64> {
    HashMap::from([
        ("low".to_string(), 0.8),
        ("medium".to_string(), 1.0),
        ("high".to_string(), 1.2),
    ])
}

fn default_rush_multiplier() -> f64 {
    1.2
}
