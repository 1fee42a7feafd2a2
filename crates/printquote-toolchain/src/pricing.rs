//! Cost model and price rounding.

use chrono::Utc;

use printquote_core::config::pricing::PricingConfig;
use printquote_entity::quote::result::{RUSH_DELIVERY, STANDARD_DELIVERY};
use printquote_entity::quote::{Complexity, Material, PricingBreakdown, QuoteResult};

use crate::gcode::round2;
use crate::toolchain::SliceReport;

/// Round a raw cost to a retail price point.
///
/// Below 5 becomes 4.90, below 10 becomes 9.90, below 20 drops to the whole
/// unit minus 0.10, up to 100 drops to the multiple of 5 minus 0.10 (never
/// below 19.90), and anything higher drops to the multiple of 10 minus 0.10.
pub fn round_price(price: f64) -> f64 {
    let rounded = if price < 5.0 {
        4.90
    } else if price < 10.0 {
        9.90
    } else if price < 20.0 {
        price.floor() - 0.10
    } else if price <= 100.0 {
        ((price / 5.0).floor() * 5.0 - 0.10).max(19.90)
    } else {
        (price / 10.0).floor() * 10.0 - 0.10
    };
    round2(rounded)
}

/// Applies the configured cost model.
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    config: PricingConfig,
}

impl PriceCalculator {
    /// Create a calculator from pricing configuration.
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Price a print of `hours` duration.
    pub fn breakdown(
        &self,
        hours: f64,
        complexity: Complexity,
        material: &Material,
        rush: bool,
    ) -> PricingBreakdown {
        let base_cost = hours * self.config.base_rate_per_hour;
        let complexity_multiplier = self.config.complexity_multiplier(complexity.as_str());
        let cost_after_complexity = base_cost * complexity_multiplier;
        let material_multiplier = self.config.material_multiplier(material.as_str());
        let cost_after_material = cost_after_complexity * material_multiplier;
        let rush_multiplier = if rush { self.config.rush_multiplier } else { 1.0 };
        let final_cost = cost_after_material * rush_multiplier;

        PricingBreakdown {
            print_time_hours: round2(hours),
            base_rate_per_hour: self.config.base_rate_per_hour,
            base_cost: round2(base_cost),
            complexity_multiplier,
            cost_after_complexity: round2(cost_after_complexity),
            material_multiplier,
            cost_after_material: round2(cost_after_material),
            rush_order: rush,
            rush_multiplier,
            cost_before_rounding: round2(final_cost),
            total: round_price(final_cost),
        }
    }

    /// Assemble the result record for a sliced job.
    pub fn quote(
        &self,
        slice: &SliceReport,
        complexity: Complexity,
        material: &Material,
        layer_height: f64,
        infill: u8,
        rush: bool,
    ) -> QuoteResult {
        let pricing = self.breakdown(slice.print_time_hours, complexity, material, rush);
        QuoteResult {
            total_cost: pricing.total,
            print_time: slice.print_time.clone(),
            material: material.clone(),
            complexity,
            layer_height,
            infill_percentage: infill,
            print_time_seconds: slice.print_time_seconds,
            filament_grams: slice.filament_grams,
            support_material: slice.support_material,
            estimated_delivery: if rush { RUSH_DELIVERY } else { STANDARD_DELIVERY }.to_string(),
            pricing,
            generated_at: Utc::now(),
        }
    }
}
