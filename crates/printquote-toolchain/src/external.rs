//! [`Toolchain`] backed by PrusaSlicer and Tweaker3 executables.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use printquote_core::config::toolchain::ToolchainConfig;
use printquote_entity::quote::{Complexity, Material};

use crate::error::ToolchainError;
use crate::gcode::parse_gcode;
use crate::orientation::parse_complexity;
use crate::profile::profile_path;
use crate::supervisor::ProcessSupervisor;
use crate::toolchain::{Orientation, SliceReport, SliceSettings, Toolchain};

/// Drives the external slicer and orientation tools under a deadline.
#[derive(Debug, Clone)]
pub struct ExternalToolchain {
    config: ToolchainConfig,
    supervisor: ProcessSupervisor,
}

impl ExternalToolchain {
    /// Create a toolchain from configuration.
    pub fn new(config: ToolchainConfig) -> Self {
        let supervisor = ProcessSupervisor::new(
            Duration::from_secs(config.timeout_seconds),
            config.capture_output,
        );
        Self { config, supervisor }
    }

    /// The configuration this toolchain runs with.
    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    async fn run_tweaker(&self, oriented: &Path) -> Result<Complexity, ToolchainError> {
        let args: Vec<OsString> = vec![
            "-i".into(),
            oriented.into(),
            "-o".into(),
            oriented.into(),
            "-vb".into(),
            "-x".into(),
            "-min".into(),
            "sur".into(),
        ];
        let output = self
            .supervisor
            .run(&self.config.tweaker3, &args, None)
            .await?
            .into_success()?;
        ensure_output(oriented).await?;
        Ok(parse_complexity(&output.stdout))
    }
}

#[async_trait]
impl Toolchain for ExternalToolchain {
    async fn convert(
        &self,
        input: &Path,
        workspace: &Path,
        stem: &str,
    ) -> Result<PathBuf, ToolchainError> {
        let output = workspace.join(format!("{stem}.stl"));
        let args: Vec<OsString> = vec![
            "--export-stl".into(),
            "--output".into(),
            output.clone().into(),
            input.into(),
        ];
        self.supervisor
            .run(&self.config.prusaslicer, &args, None)
            .await?
            .into_success()?;
        ensure_output(&output).await?;
        info!(input = %input.display(), output = %output.display(), "Converted model to STL");
        Ok(output)
    }

    async fn orient(
        &self,
        stl: &Path,
        workspace: &Path,
        stem: &str,
    ) -> Result<Orientation, ToolchainError> {
        let oriented = workspace.join(format!("{stem}_oriented.stl"));
        tokio::fs::copy(stl, &oriented).await?;

        match self.run_tweaker(&oriented).await {
            Ok(complexity) => Ok(Orientation {
                stl_path: oriented,
                complexity,
                oriented: true,
            }),
            Err(e) if self.config.orientation_fallback && !e.is_timeout() => {
                warn!(error = %e, "Orientation failed, continuing with original orientation");
                Ok(Orientation {
                    stl_path: stl.to_path_buf(),
                    complexity: Complexity::Medium,
                    oriented: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn slice(
        &self,
        stl: &Path,
        workspace: &Path,
        stem: &str,
        settings: SliceSettings,
        material: &Material,
    ) -> Result<SliceReport, ToolchainError> {
        let profile = profile_path(
            Path::new(&self.config.profiles_dir),
            settings.layer_height,
            settings.infill,
        );
        let gcode = workspace.join(format!("{stem}.gcode"));
        let args: Vec<OsString> = vec![
            "--load".into(),
            profile.clone().into(),
            "--export-gcode".into(),
            "--output".into(),
            gcode.clone().into(),
            stl.into(),
        ];
        self.supervisor
            .run(&self.config.prusaslicer, &args, None)
            .await?
            .into_success()?;
        ensure_output(&gcode).await?;

        let content = tokio::fs::read_to_string(&gcode).await?;
        let report = SliceReport::from_gcode(parse_gcode(&content), material)?;
        info!(
            profile = %profile.display(),
            print_time = %report.print_time,
            filament_grams = report.filament_grams,
            "Sliced model"
        );
        Ok(report)
    }
}

async fn ensure_output(path: &Path) -> Result<(), ToolchainError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(ToolchainError::OutputMissing(path.display().to_string())),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    /// Write an executable shell script standing in for an external tool.
    fn script(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn config(dir: &Path) -> ToolchainConfig {
        ToolchainConfig {
            profiles_dir: dir.display().to_string(),
            timeout_seconds: 5,
            ..ToolchainConfig::default()
        }
    }

    #[tokio::test]
    async fn test_slice_parses_generated_gcode() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        // Arguments: --load P --export-gcode --output OUT STL
        cfg.prusaslicer = script(
            dir.path(),
            "slicer",
            "printf '; estimated printing time (normal mode) = 1h 2m 3s\\n; filament used [mm] = 1000.0\\n' > \"$5\"",
        );
        let stl = dir.path().join("model.stl");
        std::fs::write(&stl, "solid x\nendsolid x\n").unwrap();

        let toolchain = ExternalToolchain::new(cfg);
        let report = toolchain
            .slice(
                &stl,
                dir.path(),
                "job",
                SliceSettings {
                    layer_height: 0.2,
                    infill: 15,
                },
                &Material::new("PLA"),
            )
            .await
            .unwrap();

        assert_eq!(report.print_time, "1h 2m 3s");
        assert_eq!(report.print_time_seconds, 3723);
        assert_eq!(report.filament_grams, 2.98);
        assert!(dir.path().join("job.gcode").exists());
    }

    #[tokio::test]
    async fn test_slice_without_print_time_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.prusaslicer = script(dir.path(), "slicer", "echo '; nothing' > \"$5\"");
        let stl = dir.path().join("model.stl");
        std::fs::write(&stl, "solid x\n").unwrap();

        let err = ExternalToolchain::new(cfg)
            .slice(
                &stl,
                dir.path(),
                "job",
                SliceSettings {
                    layer_height: 0.3,
                    infill: 20,
                },
                &Material::new("PLA"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolchainError::GcodeIncomplete(_)));
    }

    #[tokio::test]
    async fn test_convert_requires_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.prusaslicer = script(dir.path(), "slicer", "exit 0");
        let input = dir.path().join("part.step");
        std::fs::write(&input, "ISO-10303-21;").unwrap();

        let err = ExternalToolchain::new(cfg)
            .convert(&input, dir.path(), "job")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolchainError::OutputMissing(_)));
    }

    #[tokio::test]
    async fn test_orient_reads_complexity() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.tweaker3 = script(dir.path(), "tweaker", "echo 'Unprintability: 20.5'");
        let stl = dir.path().join("model.stl");
        std::fs::write(&stl, "solid x\n").unwrap();

        let orientation = ExternalToolchain::new(cfg)
            .orient(&stl, dir.path(), "job")
            .await
            .unwrap();
        assert!(orientation.oriented);
        assert_eq!(orientation.complexity, Complexity::High);
        assert_eq!(orientation.stl_path, dir.path().join("job_oriented.stl"));
    }

    #[tokio::test]
    async fn test_orient_fallback_keeps_original_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.tweaker3 = script(dir.path(), "tweaker", "exit 3");
        cfg.orientation_fallback = true;
        let stl = dir.path().join("model.stl");
        std::fs::write(&stl, "solid x\n").unwrap();

        let orientation = ExternalToolchain::new(cfg)
            .orient(&stl, dir.path(), "job")
            .await
            .unwrap();
        assert!(!orientation.oriented);
        assert_eq!(orientation.complexity, Complexity::Medium);
        assert_eq!(orientation.stl_path, stl);
    }

    #[tokio::test]
    async fn test_orient_failure_without_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.tweaker3 = script(dir.path(), "tweaker", "exit 3");
        let stl = dir.path().join("model.stl");
        std::fs::write(&stl, "solid x\n").unwrap();

        let err = ExternalToolchain::new(cfg)
            .orient(&stl, dir.path(), "job")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolchainError::ProcessFailed { code: 3, .. }));
    }
}
