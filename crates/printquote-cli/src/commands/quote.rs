//! Offline quotation of a local model file.
//!
//! Runs the same stages a queue worker runs, minus download and status
//! records. Intermediates live in a per-run workspace that is removed when
//! the command returns.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;

use printquote_core::config::AppConfig;
use printquote_core::error::AppError;
use printquote_core::types::id::JobId;
use printquote_entity::job::Job;
use printquote_entity::quote::{Material, QuoteResult};
use printquote_toolchain::ExternalToolchain;
use printquote_worker::{JobWorkspace, QuotePipeline};

use crate::output::{self, OutputFormat, Row};

/// Quote arguments
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Model file (STL, STEP or STP)
    pub file: PathBuf,
    /// Filament material (defaults to `submission.default_material`)
    #[arg(short, long)]
    pub material: Option<String>,
    /// Layer height in millimetres (defaults to `submission.default_layer_height`)
    #[arg(short, long)]
    pub layer: Option<f64>,
    /// Infill percentage
    #[arg(short, long, default_value_t = 15, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub infill: u8,
    /// Rush order
    #[arg(short, long)]
    pub rush: bool,
    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute quote command
pub async fn execute(args: &QuoteArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    if !args.file.is_file() {
        return Err(AppError::validation(format!(
            "File not found: {}",
            args.file.display()
        )));
    }
    let job = build_job(args, &config)?;

    tokio::fs::create_dir_all(&config.worker.temp_dir).await?;
    let workspace = JobWorkspace::create(Path::new(&config.worker.temp_dir), job.id).await?;

    let pipeline = QuotePipeline::new(
        Arc::new(ExternalToolchain::new(config.toolchain.clone())),
        config.pricing.clone(),
        config.toolchain.supported_formats.clone(),
    );
    let result = pipeline.run(&job, &args.file, workspace.path()).await?;

    if args.json || format == OutputFormat::Json {
        output::print_json(&result);
    } else {
        print_quotation(&args.file, &result);
    }
    Ok(())
}

fn build_job(args: &QuoteArgs, config: &AppConfig) -> Result<Job, AppError> {
    let policy = &config.submission;
    let material = args
        .material
        .clone()
        .unwrap_or_else(|| policy.default_material.clone());
    if !policy
        .allowed_materials
        .iter()
        .any(|m| m.eq_ignore_ascii_case(&material))
    {
        return Err(AppError::validation(format!(
            "Unsupported material '{material}'; expected one of {}",
            policy.allowed_materials.join(", ")
        )));
    }
    let layer_height = args.layer.unwrap_or(policy.default_layer_height);
    if !(policy.min_layer_height..=policy.max_layer_height).contains(&layer_height) {
        return Err(AppError::validation(format!(
            "Layer height must be between {} and {} mm",
            policy.min_layer_height, policy.max_layer_height
        )));
    }
    Ok(Job {
        id: JobId::new(),
        download_url: args.file.display().to_string(),
        material: Material::new(&material),
        layer_height,
        infill: args.infill,
        rush: args.rush,
    })
}

fn print_quotation(file: &Path, quote: &QuoteResult) {
    let pricing = &quote.pricing;
    println!("Quotation for {}", file.display());
    output::print_rows(&[
        Row::new("Material", quote.material.as_str()),
        Row::new("Layer height", format!("{} mm", quote.layer_height)),
        Row::new("Infill", format!("{}%", quote.infill_percentage)),
        Row::new("Complexity", quote.complexity.as_str()),
        Row::new("Print time", &quote.print_time),
        Row::new("Filament", format!("{:.1} g", quote.filament_grams)),
        Row::new("Supports", if quote.support_material { "yes" } else { "no" }),
        Row::new(
            "Base cost",
            format!(
                "{:.2} h x {:.2} = {:.2}",
                pricing.print_time_hours, pricing.base_rate_per_hour, pricing.base_cost
            ),
        ),
        Row::new("Complexity factor", format!("x{:.2}", pricing.complexity_multiplier)),
        Row::new("Material factor", format!("x{:.2}", pricing.material_multiplier)),
        Row::new(
            "Rush factor",
            if pricing.rush_order {
                format!("x{:.2}", pricing.rush_multiplier)
            } else {
                "-".to_string()
            },
        ),
        Row::new("Before rounding", format!("${:.2}", pricing.cost_before_rounding)),
        Row::new("Delivery", &quote.estimated_delivery),
    ]);
    output::print_success(&format!("Total: ${:.2}", quote.total_cost));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(material: Option<&str>, layer: Option<f64>) -> QuoteArgs {
        QuoteArgs {
            file: PathBuf::from("part.stl"),
            material: material.map(str::to_string),
            layer,
            infill: 20,
            rush: false,
            json: false,
        }
    }

    #[test]
    fn test_build_job_uses_defaults() {
        let job = build_job(&args(None, None), &AppConfig::default()).unwrap();
        assert_eq!(job.material.as_str(), "PLA");
        assert_eq!(job.layer_height, 0.2);
        assert_eq!(job.infill, 20);
    }

    #[test]
    fn test_build_job_rejects_unknown_material() {
        let err = build_job(&args(Some("wood"), None), &AppConfig::default()).unwrap_err();
        assert!(err.message.contains("wood"));
    }

    #[test]
    fn test_build_job_rejects_layer_out_of_bounds() {
        assert!(build_job(&args(None, Some(5.0)), &AppConfig::default()).is_err());
    }
}
