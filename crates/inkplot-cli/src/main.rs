//! inkplot: turn an image into pen plotter G-code.
//!
//! Loads an image, thresholds it to black and white, runs the toolpath
//! engine and writes the program. A metrics report (draw and travel
//! distance, efficiency, estimated time) is printed alongside.
//!
//! # Usage
//!
//! ```text
//! inkplot [OPTIONS] <IMAGE_PATH>
//! inkplot drawing.png --output drawing.gcode --preview drawing-path.png
//! ```
//!
//! Logging goes to stderr and honors `RUST_LOG`; `-v` raises the default
//! level from `info` to `debug`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod prep;
mod preview;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use inkplot_engine::{
    Bitmap, Canvas, IslandOrder, ParkMove, PathMetrics, StrategyKind, SynthesisConfig,
    SynthesisSummary, TracingObserver,
};
use inkplot_export::GcodeMetadata;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::prep::PrepOptions;

/// Convert a raster image into a pen plotter motion program.
///
/// Dark pixels become ink. Connected ink is traced into strokes,
/// simplified, fitted with arcs where the curve allows and written as
/// G-code with pen-up/pen-down commands.
#[derive(Parser)]
#[command(name = "inkplot", version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Write G-code to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render the toolpath to a PNG (draw moves red, travel blue).
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Print metrics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Full synthesis config as a JSON string.
    ///
    /// When provided, all other synthesis parameter flags are ignored.
    /// The JSON must be a valid `SynthesisConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Gray level (0-255) above which a pixel is paper.
    #[arg(long, default_value_t = prep::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Draw the image this many millimeters wide (default: fit the canvas).
    ///
    /// The aspect ratio is kept and the image sits at the top-left of the bed.
    #[arg(long)]
    width_mm: Option<f64>,

    /// Raster pixels per millimeter (default: derived from the machine profile).
    #[arg(long)]
    pixels_per_mm: Option<f64>,

    /// Plotter bed width in millimeters.
    #[arg(long, default_value_t = Canvas::default().width_mm)]
    canvas_width_mm: f64,

    /// Plotter bed height in millimeters.
    #[arg(long, default_value_t = Canvas::default().height_mm)]
    canvas_height_mm: f64,

    /// Maximum distance between ink points joined into one stroke.
    #[arg(long, default_value_t = SynthesisConfig::DEFAULT_SEARCH_RADIUS_MM)]
    search_radius_mm: f64,

    /// Neighbours considered at each traversal step.
    #[arg(long, default_value_t = SynthesisConfig::DEFAULT_NEIGHBOUR_COUNT, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    neighbour_count: usize,

    /// RDP simplification tolerance in pixels.
    #[arg(long, default_value_t = SynthesisConfig::DEFAULT_RDP_EPSILON_PX)]
    rdp_epsilon_px: f64,

    /// Maximum deviation of a fitted arc from its points, in pixels.
    #[arg(long, default_value_t = SynthesisConfig::DEFAULT_ARC_TOLERANCE_PX)]
    arc_tolerance_px: f64,

    /// Emit straight lines only.
    #[arg(long)]
    no_arcs: bool,

    /// Pen-up feed rate (mm/min).
    #[arg(long, default_value_t = SynthesisConfig::DEFAULT_TRAVEL_FEED)]
    travel_feed: f64,

    /// Pen-down feed rate (mm/min).
    #[arg(long, default_value_t = SynthesisConfig::DEFAULT_DRAW_FEED)]
    draw_feed: f64,

    /// Order in which islands are drawn.
    #[arg(long, value_enum, default_value_t = Order::Discovery)]
    order: Order,

    /// Mirror Y so the top of the image lands at the far edge of the bed.
    #[arg(long)]
    flip_y: bool,

    /// Final move of the program.
    #[arg(long, value_enum, default_value_t = Park::Origin)]
    park: Park,

    /// Toolpath strategy.
    #[arg(long, value_enum, default_value_t = Strategy::Islands)]
    strategy: Strategy,

    /// Pen nib width in millimeters (scanline spacing for `serpentine`).
    #[arg(long, default_value_t = SynthesisConfig::DEFAULT_PEN_NIB_MM)]
    pen_nib_mm: f64,

    /// Log traversal progress every this many points (0 disables).
    #[arg(long, default_value_t = 0)]
    progress_interval: usize,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

/// Island ordering selection.
#[derive(Clone, Copy, ValueEnum)]
enum Order {
    /// The order islands were found in.
    Discovery,
    /// Top of the image first, then left to right.
    TopToBottom,
}

/// Park move selection.
#[derive(Clone, Copy, ValueEnum)]
enum Park {
    /// Rapid back to X0 Y0.
    Origin,
    /// Machine home cycle (G28).
    Home,
}

/// Toolpath strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Trace connected ink into strokes with arcs.
    Islands,
    /// Scan rows back and forth.
    Serpentine,
}

/// Build a [`SynthesisConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<SynthesisConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let defaults = SynthesisConfig::default();
    Ok(SynthesisConfig {
        pixels_per_mm: cli.pixels_per_mm.unwrap_or(defaults.pixels_per_mm),
        canvas: Canvas {
            width_mm: cli.canvas_width_mm,
            height_mm: cli.canvas_height_mm,
        },
        search_radius_mm: cli.search_radius_mm,
        neighbour_count: cli.neighbour_count,
        rdp_epsilon_px: cli.rdp_epsilon_px,
        arc_tolerance_px: cli.arc_tolerance_px,
        arc_fitting: !cli.no_arcs,
        travel_feed: cli.travel_feed,
        draw_feed: cli.draw_feed,
        island_order: match cli.order {
            Order::Discovery => IslandOrder::Discovery,
            Order::TopToBottom => IslandOrder::TopToBottom,
        },
        flip_y: cli.flip_y,
        park: match cli.park {
            Park::Origin => ParkMove::Origin,
            Park::Home => ParkMove::Home,
        },
        strategy: match cli.strategy {
            Strategy::Islands => StrategyKind::Islands,
            Strategy::Serpentine => StrategyKind::Serpentine,
        },
        pen_nib_mm: cli.pen_nib_mm,
        progress_interval: cli.progress_interval,
    })
}

/// Install a stderr subscriber. `RUST_LOG` directives override the default.
fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Everything `--json` prints.
#[derive(Serialize)]
struct Report<'a> {
    summary: &'a SynthesisSummary,
    metrics: &'a PathMetrics,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let options = PrepOptions {
        threshold: cli.threshold,
        width_mm: cli.width_mm,
        pixels_per_mm: config.pixels_per_mm,
        canvas: config.canvas,
    };
    let gray = match prep::prepare(&image_bytes, &options) {
        Ok(gray) => gray,
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    info!(
        image = %cli.image_path.display(),
        width = gray.width(),
        height = gray.height(),
        "image prepared"
    );

    let bitmap = Bitmap::from_gray_image(&gray);
    let toolpath =
        match inkplot_engine::synthesize_with_observer(&bitmap, &config, &mut TracingObserver) {
            Ok(toolpath) => toolpath,
            Err(e) => {
                eprintln!("Synthesis error: {e}");
                return ExitCode::FAILURE;
            }
        };
    let metrics = inkplot_engine::analyze(&toolpath.commands);

    let config_json = match serde_json::to_string(&config) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing config: {e}");
            return ExitCode::FAILURE;
        }
    };
    let title = cli.image_path.file_name().and_then(|s| s.to_str());
    let metadata = GcodeMetadata {
        title,
        pen_nib_mm: Some(config.pen_nib_mm),
        description: None,
        config_json: Some(&config_json),
    };
    let gcode = inkplot_export::to_gcode(&toolpath.commands, &metadata);

    match cli.output {
        Some(ref path) => match std::fs::write(path, &gcode) {
            Ok(()) => info!(
                path = %path.display(),
                bytes = gcode.len(),
                commands = toolpath.commands.len(),
                "G-code written"
            ),
            Err(e) => {
                eprintln!("Error writing G-code to {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => print!("{gcode}"),
    }

    if let Some(ref preview_path) = cli.preview {
        let rendered = preview::render_preview(
            &toolpath.commands,
            config.canvas,
            preview::DEFAULT_PREVIEW_SCALE,
            config.flip_y,
        );
        match rendered.map(|pixmap| pixmap.save_png(preview_path)) {
            Some(Ok(())) => info!(path = %preview_path.display(), "preview written"),
            Some(Err(e)) => {
                eprintln!("Error writing preview to {}: {e}", preview_path.display());
            }
            None => eprintln!("Canvas too small to preview"),
        }
    }

    // With G-code on stdout the report goes to stderr so the two never mix.
    let report = if cli.json {
        match serde_json::to_string_pretty(&Report {
            summary: &toolpath.summary,
            metrics: &metrics,
        }) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error serializing metrics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        format!("{}\n\n{}", toolpath.summary.report(), metrics.report())
    };
    if cli.output.is_some() {
        println!("{report}");
    } else {
        eprintln!("{report}");
    }

    ExitCode::SUCCESS
}
