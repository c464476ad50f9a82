use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use surface_inspect::config::InspectionConfigBuilder;
use surface_inspect::detection::loader::{ALLOWED_EXTENSIONS, is_allowed_extension, sanitize_file_stem};
use surface_inspect::{
    ClassificationPolicy, ContourMode, InspectionConfig, Inspector, OutputFormat, VerdictReport, save_annotated,
};

#[derive(Parser)]
#[command(name = "surface-inspect")]
#[command(about = "Inspect product photos for visible surface defects")]
struct Cli {
    /// Images to inspect (PNG, JPEG or WebP)
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Named parameter set to start from
    #[arg(long, value_enum, default_value_t = Preset::Fixed)]
    preset: Preset,

    /// JSON configuration file; replaces the preset
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum contour area (px²) for a defect
    #[arg(long)]
    min_area: Option<f64>,

    /// Lower hysteresis threshold
    #[arg(long)]
    canny_low: Option<f32>,

    /// Upper hysteresis threshold
    #[arg(long)]
    canny_high: Option<f32>,

    /// Gaussian kernel size (positive, odd)
    #[arg(long)]
    blur_kernel: Option<u32>,

    /// Gaussian sigma; 0 derives it from the kernel size
    #[arg(long)]
    blur_sigma: Option<f32>,

    /// Edge gap-closing radius; 0 disables
    #[arg(long)]
    gap_closing: Option<u8>,

    /// Which contours reach the classifier
    #[arg(long, value_enum)]
    contour_mode: Option<ContourModeArg>,

    /// Area classification policy
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Fraction of the largest contour below which a relative defect must stay
    #[arg(long)]
    relative_fraction: Option<f64>,

    /// Do not draw "DEFECT" labels above boxes
    #[arg(long)]
    no_labels: bool,

    /// Write annotated images into this directory
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Save per-stage debug images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print one JSON object per image instead of text
    #[arg(long)]
    json: bool,

    /// Log per-contour details (implies debug logging)
    #[arg(short, long)]
    verbose: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Fixed,
    Relative,
}

#[derive(Clone, Copy, ValueEnum)]
enum ContourModeArg {
    External,
    All,
}

impl From<ContourModeArg> for ContourMode {
    fn from(arg: ContourModeArg) -> Self {
        match arg {
            ContourModeArg::External => ContourMode::External,
            ContourModeArg::All => ContourMode::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Fixed,
    Relative,
}

impl From<PolicyArg> for ClassificationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Fixed => ClassificationPolicy::Fixed,
            PolicyArg::Relative => ClassificationPolicy::Relative,
        }
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<InspectionConfig> {
    let base = match &cli.config {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            InspectionConfig::from_json_str(&data)?
        }
        None => match cli.preset {
            Preset::Fixed => InspectionConfig::fixed_preset(),
            Preset::Relative => InspectionConfig::relative_preset(),
        },
    };

    let low = cli.canny_low.unwrap_or(base.canny_low);
    let high = cli.canny_high.unwrap_or(base.canny_high);
    let mut builder = InspectionConfigBuilder::from_config(base).canny_thresholds(low, high);

    if let Some(area) = cli.min_area {
        builder = builder.min_defect_area(area);
    }
    if let Some(kernel) = cli.blur_kernel {
        builder = builder.blur_kernel_size(kernel);
    }
    if let Some(sigma) = cli.blur_sigma {
        builder = builder.blur_sigma(sigma);
    }
    if let Some(radius) = cli.gap_closing {
        builder = builder.gap_closing_radius(radius);
    }
    if let Some(mode) = cli.contour_mode {
        builder = builder.contour_mode(mode.into());
    }
    if let Some(policy) = cli.policy {
        builder = builder.classification_policy(policy.into());
    }
    if let Some(fraction) = cli.relative_fraction {
        builder = builder.relative_threshold_fraction(fraction);
    }
    if cli.no_labels {
        builder = builder.draw_labels(false);
    }

    Ok(builder.build()?)
}

fn inspect_one(inspector: &Inspector, path: &Path, out_dir: Option<&Path>) -> anyhow::Result<VerdictReport> {
    if !is_allowed_extension(&path.to_string_lossy()) {
        anyhow::bail!(
            "{} is not an accepted image file (expected one of: {})",
            path.display(),
            ALLOWED_EXTENSIONS.join(", ")
        );
    }

    let result = inspector
        .inspect_path(path)
        .with_context(|| format!("Failed to inspect {}", path.display()))?;

    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let output_path = match out_dir {
        Some(dir) => Some(save_annotated(&result, dir, &source_name, OutputFormat::Jpeg)?),
        None => None,
    };

    Ok(result.report(path.display().to_string(), output_path))
}

fn print_report(report: &VerdictReport, verbose: bool) {
    println!("\n=== {} ===", report.source);
    println!("Status: {}", report.status);
    println!("{}", report.message);
    println!("Contours analysed: {}", report.contour_count);

    if verbose && !report.defects.is_empty() {
        println!("\nDefects:");
        for (i, defect) in report.defects.iter().enumerate() {
            let b = &defect.bounds;
            println!(
                "  Defect {} at ({}, {}) {}x{} - area: {:.1}",
                i + 1,
                b.x,
                b.y,
                b.width,
                b.height,
                defect.area
            );
        }
    }

    if let Some(path) = &report.output_path {
        println!("Annotated image: {}", path.display());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { cli.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&cli)?;
    tracing::debug!(?config, "configuration");

    let base = Inspector::new(config)?.with_verbose(cli.verbose);
    let many = cli.images.len() > 1;

    // Each image runs on its own blocking task; only the output directory is shared.
    let mut handles = Vec::with_capacity(cli.images.len());
    for (i, path) in cli.images.iter().enumerate() {
        let inspector = match &cli.debug_out {
            Some(dir) if many => {
                let stem = sanitize_file_stem(&path.to_string_lossy());
                base.clone().with_debug(dir.join(format!("{:02}_{}", i + 1, stem)))?
            }
            Some(dir) => base.clone().with_debug(dir.clone())?,
            None => base.clone(),
        };
        let path = path.clone();
        let out_dir = cli.out_dir.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            inspect_one(&inspector, &path, out_dir.as_deref())
        }));
    }

    let mut failed = 0usize;
    for (path, handle) in cli.images.iter().zip(handles) {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(anyhow::anyhow!("Inspection task for {} aborted: {}", path.display(), e)),
        };

        match outcome {
            Ok(report) if cli.json => println!("{}", serde_json::to_string(&report)?),
            Ok(report) => print_report(&report, cli.verbose),
            Err(e) => {
                failed += 1;
                tracing::error!(file = %path.display(), error = %format!("{e:#}"), "inspection failed");
            }
        }
    }

    if failed > 0 {
        eprintln!("{} of {} images could not be inspected", failed, cli.images.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
