//! Extraction of print statistics from PrusaSlicer G-code comments.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use printquote_entity::quote::Material;

const PRINT_TIME_PREFIX: &str = "; estimated printing time (normal mode) =";
const FILAMENT_PREFIX: &str = "; filament used [mm] =";
const SUPPORT_MARKER: &str = "; support_material = 1";

/// Filament radius in centimetres (1.75 mm filament).
const FILAMENT_RADIUS_CM: f64 = 0.0875;

/// Statistics read from a G-code file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GcodeStats {
    /// Print time as written by the slicer, e.g. `1d 2h 3m 4s`.
    pub print_time: Option<String>,
    /// Print time in seconds.
    pub print_time_seconds: u64,
    /// Filament length in millimetres.
    pub filament_used_mm: f64,
    /// Whether support material was generated.
    pub support_material: bool,
}

impl GcodeStats {
    /// Print time in hours, rounded to two decimals.
    pub fn print_time_hours(&self) -> f64 {
        round2(self.print_time_seconds as f64 / 3600.0)
    }
}

/// Scan G-code text for the slicer's summary comments.
pub fn parse_gcode(content: &str) -> GcodeStats {
    let mut stats = GcodeStats::default();

    for line in content.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(PRINT_TIME_PREFIX) {
            let time = rest.trim();
            if stats.print_time.is_none() && !time.is_empty() {
                stats.print_time_seconds = parse_duration_seconds(time);
                stats.print_time = Some(time.to_string());
            }
        } else if let Some(rest) = line.strip_prefix(FILAMENT_PREFIX) {
            if let Some(mm) = leading_number(rest.trim()) {
                stats.filament_used_mm = mm;
            }
        } else if line == SUPPORT_MARKER {
            stats.support_material = true;
        }
    }

    stats
}

/// Convert `1d 2h 3m 4s` style durations to seconds. Unknown tokens are ignored.
pub fn parse_duration_seconds(text: &str) -> u64 {
    let mut total = 0u64;
    let mut digits = String::new();

    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        if !digits.is_empty() {
            let value: u64 = digits.parse().unwrap_or(0);
            total += match ch {
                'd' => value * 86_400,
                'h' => value * 3_600,
                'm' => value * 60,
                's' => value,
                _ => 0,
            };
            digits.clear();
        }
    }

    total
}

/// Estimated filament mass in grams, rounded to two decimals.
pub fn filament_weight_grams(filament_mm: f64, material: &Material) -> f64 {
    let length_cm = filament_mm / 10.0;
    let volume_cm3 = PI * FILAMENT_RADIUS_CM.powi(2) * length_cm;
    round2(volume_cm3 * material.density())
}

fn leading_number(text: &str) -> Option<f64> {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

/// Round to cents.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
