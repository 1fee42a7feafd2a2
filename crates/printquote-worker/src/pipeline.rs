//! Quotation stages run against a local input file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use printquote_core::config::pricing::PricingConfig;
use printquote_entity::failure::FailureKind;
use printquote_entity::job::Job;
use printquote_entity::quote::QuoteResult;
use printquote_toolchain::input::check_input;
use printquote_toolchain::pricing::PriceCalculator;
use printquote_toolchain::{SliceSettings, Toolchain};

use crate::error::StageError;

/// Input check, conversion, mesh validation, orientation, slicing, pricing.
#[derive(Debug, Clone)]
pub struct QuotePipeline {
    toolchain: Arc<dyn Toolchain>,
    pricing: PriceCalculator,
    supported_formats: Vec<String>,
}

impl QuotePipeline {
    /// Create a pipeline over `toolchain`.
    pub fn new(
        toolchain: Arc<dyn Toolchain>,
        pricing: PricingConfig,
        supported_formats: Vec<String>,
    ) -> Self {
        Self {
            toolchain,
            pricing: PriceCalculator::new(pricing),
            supported_formats,
        }
    }

    /// Quote `input` for `job`, writing intermediates under `workspace`.
    pub async fn run(
        &self,
        job: &Job,
        input: &Path,
        workspace: &Path,
    ) -> Result<QuoteResult, StageError> {
        let stem = job.id.to_string();
        let mut started = Instant::now();

        let format = check_input(input, &self.supported_formats)
            .await
            .map_err(|e| StageError::from_toolchain(FailureKind::UnsupportedFormat, e))?;

        let stl: PathBuf = if format.needs_conversion() {
            let stl = self
                .toolchain
                .convert(input, workspace, &stem)
                .await
                .map_err(|e| StageError::from_toolchain(FailureKind::Conversion, e))?;
            stage_done(job, "convert", &mut started);
            stl
        } else {
            input.to_path_buf()
        };

        let mesh = self
            .toolchain
            .validate_mesh(&stl)
            .await
            .map_err(|e| StageError::from_toolchain(FailureKind::MeshInvalid, e))?;
        tracing::debug!(job_id = %job.id, triangles = mesh.triangles, volume = mesh.volume, "Mesh is valid");
        stage_done(job, "validate_mesh", &mut started);

        let orientation = self
            .toolchain
            .orient(&stl, workspace, &stem)
            .await
            .map_err(|e| StageError::from_toolchain(FailureKind::Orientation, e))?;
        stage_done(job, "orient", &mut started);

        let settings = SliceSettings {
            layer_height: job.layer_height,
            infill: job.infill,
        };
        let slice = self
            .toolchain
            .slice(&orientation.stl_path, workspace, &stem, settings, &job.material)
            .await
            .map_err(|e| StageError::from_toolchain(FailureKind::Slicing, e))?;
        stage_done(job, "slice", &mut started);

        let quote = self.pricing.quote(
            &slice,
            orientation.complexity,
            &job.material,
            job.layer_height,
            job.infill,
            job.rush,
        );
        tracing::info!(
            job_id = %job.id,
            total_cost = quote.total_cost,
            complexity = %quote.complexity.as_str(),
            print_time = %quote.print_time,
            "Quotation computed"
        );
        Ok(quote)
    }
}

fn stage_done(job: &Job, stage: &str, started: &mut Instant) {
    tracing::info!(
        job_id = %job.id,
        stage,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Stage finished"
    );
    *started = Instant::now();
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use printquote_core::types::JobId;
    use printquote_entity::quote::{Complexity, Material};
    use printquote_toolchain::{Orientation, SliceReport, ToolchainError};

    use super::*;

    /// Records stage calls; conversion writes a real file.
    #[derive(Debug, Default)]
    struct RecordingToolchain {
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingToolchain {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Toolchain for RecordingToolchain {
        async fn convert(&self, _: &Path, workspace: &Path, stem: &str) -> Result<PathBuf, ToolchainError> {
            self.calls.lock().unwrap().push("convert");
            let out = workspace.join(format!("{stem}.stl"));
            tokio::fs::write(&out, b"solid converted").await?;
            Ok(out)
        }

        async fn validate_mesh(
            &self,
            stl: &Path,
        ) -> Result<printquote_toolchain::mesh::MeshReport, ToolchainError> {
            self.calls.lock().unwrap().push("validate");
            assert_eq!(extension_of(stl), "stl");
            Ok(printquote_toolchain::mesh::MeshReport {
                triangles: 12,
                vertices: 8,
                volume: 8.0,
                watertight: true,
                winding_consistent: true,
            })
        }

        async fn orient(&self, stl: &Path, _: &Path, _: &str) -> Result<Orientation, ToolchainError> {
            self.calls.lock().unwrap().push("orient");
            Ok(Orientation {
                stl_path: stl.to_path_buf(),
                complexity: Complexity::High,
                oriented: true,
            })
        }

        async fn slice(
            &self,
            _: &Path,
            _: &Path,
            _: &str,
            settings: SliceSettings,
            _: &Material,
        ) -> Result<SliceReport, ToolchainError> {
            self.calls.lock().unwrap().push("slice");
            assert_eq!(settings.infill, 100);
            Ok(SliceReport {
                print_time: "10h".to_string(),
                print_time_seconds: 36_000,
                print_time_hours: 10.0,
                filament_used_mm: 10_000.0,
                filament_grams: 29.83,
                support_material: true,
            })
        }
    }

    fn extension_of(path: &Path) -> String {
        printquote_toolchain::input::extension_of(path)
    }

    fn job(rush: bool) -> Job {
        Job {
            id: JobId::new(),
            download_url: "https://x/part.step".to_string(),
            material: Material::new("ABS"),
            layer_height: 0.2,
            infill: 100,
            rush,
        }
    }

    fn pipeline(toolchain: Arc<RecordingToolchain>) -> QuotePipeline {
        QuotePipeline::new(
            toolchain,
            PricingConfig::default(),
            vec!["stl".to_string(), "step".to_string(), "stp".to_string()],
        )
    }

    #[tokio::test]
    async fn test_step_input_is_converted_before_validation() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("part.step");
        std::fs::write(&input, b"ISO-10303-21;").unwrap();
        let toolchain = Arc::new(RecordingToolchain::default());

        let quote = pipeline(toolchain.clone())
            .run(&job(true), &input, dir.path())
            .await
            .unwrap();

        assert_eq!(toolchain.calls(), ["convert", "validate", "orient", "slice"]);
        assert_eq!(quote.complexity, Complexity::High);
        assert_eq!(quote.estimated_delivery, "24-48 hours");
        // 10h x 3.0 x 1.2 (high) x 1.2 (ABS) x 1.2 (rush) = 51.84
        assert_eq!(quote.total_cost, 49.90);
        assert!(quote.support_material);
    }

    #[tokio::test]
    async fn test_unsupported_extension_stops_before_any_tool() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("part.obj");
        std::fs::write(&input, b"v 0 0 0").unwrap();
        let toolchain = Arc::new(RecordingToolchain::default());

        let err = pipeline(toolchain.clone())
            .run(&job(false), &input, dir.path())
            .await
            .unwrap_err();

        assert_eq!(err.kind, FailureKind::UnsupportedFormat);
        assert!(err.message.contains(".obj"));
        assert!(toolchain.calls().is_empty());
    }
}
