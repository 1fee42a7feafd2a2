//! Result record stored under `result:{id}` for completed jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Complexity, Material};

/// Delivery estimate for standard orders.
pub const STANDARD_DELIVERY: &str = "2-3 business days";
/// Delivery estimate for rush orders.
pub const RUSH_DELIVERY: &str = "24-48 hours";

/// The quotation produced by a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    /// Final rounded price.
    pub total_cost: f64,
    /// Human-readable print time as reported by the slicer (e.g. `1h 2m 3s`).
    pub print_time: String,
    /// Material echoed from the job.
    pub material: Material,
    /// Complexity used for pricing.
    pub complexity: Complexity,
    /// Layer height echoed from the job.
    pub layer_height: f64,
    /// Infill echoed from the job.
    pub infill_percentage: u8,
    /// Print time in whole seconds.
    pub print_time_seconds: u64,
    /// Estimated filament mass in grams.
    pub filament_grams: f64,
    /// Whether the slicer generated support material.
    pub support_material: bool,
    /// Delivery estimate text.
    pub estimated_delivery: String,
    /// Full cost breakdown.
    pub pricing: PricingBreakdown,
    /// When the quotation was produced.
    pub generated_at: DateTime<Utc>,
}

/// Intermediate values of the cost model, rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    /// Print time in hours.
    pub print_time_hours: f64,
    /// Rate applied per hour.
    pub base_rate_per_hour: f64,
    /// `hours x rate`.
    pub base_cost: f64,
    /// Complexity multiplier applied.
    pub complexity_multiplier: f64,
    /// Cost after the complexity multiplier.
    pub cost_after_complexity: f64,
    /// Material multiplier applied.
    pub material_multiplier: f64,
    /// Cost after the material multiplier.
    pub cost_after_material: f64,
    /// Whether the rush multiplier was applied.
    pub rush_order: bool,
    /// Rush multiplier applied (1.0 when not rushed).
    pub rush_multiplier: f64,
    /// Cost before price rounding.
    pub cost_before_rounding: f64,
    /// Rounded total.
    pub total: f64,
}
