//! The geometry toolchain seam used by the worker pipeline.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use printquote_entity::quote::{Complexity, Material};

use crate::error::ToolchainError;
use crate::gcode::{GcodeStats, filament_weight_grams};
use crate::mesh::{self, MeshReport};

/// Slicer settings taken from the job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceSettings {
    /// Layer height in millimetres.
    pub layer_height: f64,
    /// Infill percentage.
    pub infill: u8,
}

/// Outcome of the orientation stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Orientation {
    /// STL to slice.
    pub stl_path: PathBuf,
    /// Classified model complexity.
    pub complexity: Complexity,
    /// False when the fallback kept the original orientation.
    pub oriented: bool,
}

/// Print statistics produced by slicing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceReport {
    /// Human-readable print time as written by the slicer.
    pub print_time: String,
    /// Print time in seconds.
    pub print_time_seconds: u64,
    /// Print time in hours, two decimals.
    pub print_time_hours: f64,
    /// Filament length in millimetres.
    pub filament_used_mm: f64,
    /// Estimated filament mass in grams.
    pub filament_grams: f64,
    /// Whether support material was generated.
    pub support_material: bool,
}

impl SliceReport {
    /// Build a report from parsed G-code, failing when the print time is absent.
    pub fn from_gcode(stats: GcodeStats, material: &Material) -> Result<Self, ToolchainError> {
        let print_time_hours = stats.print_time_hours();
        let print_time = stats.print_time.ok_or_else(|| {
            ToolchainError::GcodeIncomplete("estimated printing time not found".to_string())
        })?;
        Ok(Self {
            print_time,
            print_time_seconds: stats.print_time_seconds,
            print_time_hours,
            filament_used_mm: stats.filament_used_mm,
            filament_grams: filament_weight_grams(stats.filament_used_mm, material),
            support_material: stats.support_material,
        })
    }
}

/// Stages of the geometry computation.
///
/// Implementations write every intermediate file under `workspace`, naming
/// them after `stem` so one workspace never mixes jobs.
#[async_trait]
pub trait Toolchain: Send + Sync + fmt::Debug + 'static {
    /// Convert a CAD solid into an STL.
    async fn convert(
        &self,
        input: &Path,
        workspace: &Path,
        stem: &str,
    ) -> Result<PathBuf, ToolchainError>;

    /// Check that the STL is printable.
    ///
    /// The default implementation runs the native checks in [`crate::mesh`]
    /// on the blocking pool.
    async fn validate_mesh(&self, stl: &Path) -> Result<MeshReport, ToolchainError> {
        let path = stl.to_path_buf();
        let report = tokio::task::spawn_blocking(move || mesh::inspect_file(&path))
            .await
            .map_err(|e| ToolchainError::Io(std::io::Error::other(e)))??;
        if report.is_valid() {
            Ok(report)
        } else {
            Err(ToolchainError::MeshInvalid(report.issues()))
        }
    }

    /// Choose a print orientation and classify complexity.
    async fn orient(
        &self,
        stl: &Path,
        workspace: &Path,
        stem: &str,
    ) -> Result<Orientation, ToolchainError>;

    /// Slice the STL and report print statistics.
    async fn slice(
        &self,
        stl: &Path,
        workspace: &Path,
        stem: &str,
        settings: SliceSettings,
        material: &Material,
    ) -> Result<SliceReport, ToolchainError>;
}
