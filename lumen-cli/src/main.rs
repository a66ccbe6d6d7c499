//! lumen CLI: D86 energy containment and bright-dot counting on image files.

mod render;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use common::log_setup::{setup_logging, LogOptions};
use lumen::{analyze, Analysis, AnalysisReport, AnalysisResult, PixelFormat, RawConfig};

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Energy-containment (D86) and bright-dot counting for raster images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the ellipse holding a share of the image energy.
    D86(D86Args),

    /// Count bright dots above a minimum area.
    Count(CountArgs),
}

#[derive(Debug, Clone, Args)]
struct CommonArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Write the input with the overlay drawn on it (PNG).
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct D86Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Physical width of the image (default 1.0).
    #[arg(long)]
    hx: Option<String>,

    /// Physical height of the image (default 1.0).
    #[arg(long)]
    hy: Option<String>,

    /// Enclosed energy percentage in (0, 100] (default 86).
    #[arg(long)]
    energy_ratio: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct CountArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Minimum dot area in pixels (default 5).
    #[arg(long)]
    min_area: Option<String>,

    /// Gaussian blur kernel size, 0 disables (default 0).
    #[arg(long)]
    blur: Option<String>,

    /// Threshold: otsu, binary, or a level 0-255 (default otsu).
    #[arg(long)]
    threshold: Option<String>,

    /// Count dark dots on a light background.
    #[arg(long)]
    invert: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(&LogOptions::new("lumen", "info"))?;

    let (common_args, raw, analysis) = match cli.command {
        Commands::D86(args) => {
            let raw = RawConfig {
                hx: args.hx,
                hy: args.hy,
                energy_ratio: args.energy_ratio,
                ..Default::default()
            };
            (args.common, raw, Analysis::D86)
        }
        Commands::Count(args) => {
            let raw = RawConfig {
                min_area: args.min_area,
                blur_kernel: args.blur,
                threshold_mode: args.threshold,
                invert: args.invert,
                ..Default::default()
            };
            (args.common, raw, Analysis::PointCount)
        }
    };

    run(&common_args, &raw, analysis)
}

fn run(args: &CommonArgs, raw: &RawConfig, analysis: Analysis) -> anyhow::Result<()> {
    let config = raw.resolve();

    let rgb = image::open(&args.image)
        .with_context(|| format!("Failed to open image {}", args.image.display()))?
        .to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    tracing::info!(path = %args.image.display(), width, height, %analysis, "Loaded image");

    let buffer = lumen::ImageBuffer::new(width, height, PixelFormat::Rgb8, rgb.as_raw())?;
    let report = analyze(&buffer, &config, analysis)
        .with_context(|| format!("{} analysis failed", analysis))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(path) = &args.overlay {
        save_overlay(rgb, &report, path)?;
    }

    Ok(())
}

fn save_overlay(mut rgb: image::RgbImage, report: &AnalysisReport, path: &Path) -> anyhow::Result<()> {
    render::draw_overlay(&mut rgb, &report.overlay);
    rgb.save(path)
        .with_context(|| format!("Failed to save overlay {}", path.display()))?;
    tracing::info!(path = %path.display(), "Saved overlay");
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    match &report.result {
        AnalysisResult::D86(d86) => {
            println!("Shape:       {:?}", d86.shape);
            println!("Gamma:       {:.6}", d86.gamma);
            println!("Major axis:  {:.6} ({:.2} px)", d86.major_axis, d86.major_axis_px);
            println!("Minor axis:  {:.6} ({:.2} px)", d86.minor_axis, d86.minor_axis_px);
            println!("Angle:       {:.2} deg", d86.angle_deg);
            println!("Center:      ({:.2}, {:.2}) px", d86.center_px.0, d86.center_px.1);
            println!("Enclosed:    {:.2}%", d86.enclosed_fraction * 100.0);
        }
        AnalysisResult::PointCount(count) => {
            println!("Count:       {}", count.count);
            println!("Rejected:    {}", count.rejected);
            for region in &count.regions {
                println!(
                    "  #{:<4} area {:>6}  bbox ({}, {}, {}, {})",
                    region.label,
                    region.area,
                    region.bbox.x,
                    region.bbox.y,
                    region.bbox.width,
                    region.bbox.height
                );
            }
        }
    }
}
