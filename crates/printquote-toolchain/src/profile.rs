//! Slicer profile selection.

use std::path::{Path, PathBuf};

/// Profile used when no tuned profile matches.
pub const FALLBACK_PROFILE: &str = "cfg.ini";

/// Tuned profiles keyed by (layer height mm, infill %).
const PROFILES: &[(f64, u8, &str)] = &[
    (0.2, 15, "default_0.2_15.ini"),
    (0.2, 100, "default_0.2_100.ini"),
];

/// File name of the profile for the given settings.
pub fn profile_name(layer_height: f64, infill: u8) -> &'static str {
    PROFILES
        .iter()
        .find(|(height, fill, _)| (height - layer_height).abs() < 1e-9 && *fill == infill)
        .map(|(_, _, name)| *name)
        .unwrap_or(FALLBACK_PROFILE)
}

/// Full path of the profile under `profiles_dir`.
pub fn profile_path(profiles_dir: &Path, layer_height: f64, infill: u8) -> PathBuf {
    profiles_dir.join(profile_name(layer_height, infill))
}
