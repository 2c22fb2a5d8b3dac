//! Serpentine raster scan: fill ink regions with horizontal strokes.
//!
//! Rows are sampled one pen nib apart. Even-indexed rows run left to
//! right and odd-indexed rows right to left, so consecutive rows start
//! near where the previous one ended. Every maximal run of ink on a
//! sampled row becomes one pen-down stroke.

use crate::diagnostics::{SynthesisSummary, Toolpath};
use crate::emit::{EmitParams, MotionEmitter};
use crate::observer::SynthesisObserver;
use crate::raster::Bitmap;
use crate::strategy::StrategyKind;
use crate::types::{Point, Scale, SynthesisConfig};

/// A horizontal run of ink on one row, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// Row.
    pub y: u32,
    /// Column where drawing starts.
    pub from_x: u32,
    /// Column where drawing ends (inclusive).
    pub to_x: u32,
}

impl Run {
    /// Number of pixels covered; at least one.
    #[must_use]
    pub const fn pixel_count(&self) -> u32 {
        self.from_x.abs_diff(self.to_x) + 1
    }
}

/// Row spacing in pixels for a pen nib of `pen_nib_mm` at `rows_per_mm`
/// raster rows per bed millimeter, never less than one.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn row_step(pen_nib_mm: f64, rows_per_mm: f64) -> u32 {
    let step = (pen_nib_mm * rows_per_mm).floor();
    if step.is_finite() && step >= 1.0 {
        step.min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

/// Ink runs of one row, left to right.
fn row_runs(bitmap: &Bitmap, y: u32) -> Vec<Run> {
    let width = bitmap.dimensions().width;
    let mut runs = Vec::new();
    let mut start = None;
    for x in 0..width {
        match (bitmap.is_ink(x, y), start) {
            (true, None) => start = Some(x),
            (false, Some(from_x)) => {
                runs.push(Run {
                    y,
                    from_x,
                    to_x: x - 1,
                });
                start = None;
            }
            _ => {}
        }
    }
    if let Some(from_x) = start {
        runs.push(Run {
            y,
            from_x,
            to_x: width - 1,
        });
    }
    runs
}

/// All runs of a serpentine scan, in drawing order.
#[must_use]
pub fn scan_runs(bitmap: &Bitmap, step: u32) -> Vec<Run> {
    let height = bitmap.dimensions().height;
    let mut runs = Vec::new();
    for (row, y) in (0..height).step_by(step.max(1) as usize).enumerate() {
        let mut found = row_runs(bitmap, y);
        if row % 2 == 1 {
            found.reverse();
            for run in &mut found {
                std::mem::swap(&mut run.from_x, &mut run.to_x);
            }
        }
        runs.extend(found);
    }
    runs
}

/// Build a serpentine toolpath for `bitmap`.
pub(crate) fn serpentine(
    bitmap: &Bitmap,
    config: &SynthesisConfig,
    observer: &mut dyn SynthesisObserver,
) -> Toolpath {
    let dimensions = bitmap.dimensions();
    let scale = Scale::from_canvas(config.canvas, dimensions);
    let step = row_step(config.pen_nib_mm, scale.y_mm_per_px.recip());
    let runs = scan_runs(bitmap, step);

    let mut emitter = MotionEmitter::new(EmitParams::from_config(config, scale));
    for (index, run) in runs.iter().enumerate() {
        let y = f64::from(run.y);
        emitter.travel_to(Point::new(f64::from(run.from_x), y));
        emitter.pen_down();
        emitter.line_to(Point::new(f64::from(run.to_x), y));
        emitter.pen_up();
        observer.island_completed(index, run.pixel_count() as usize);
    }
    let commands = emitter.finish();

    let summary = SynthesisSummary {
        strategy: StrategyKind::Serpentine,
        image_width: dimensions.width,
        image_height: dimensions.height,
        point_count: runs.iter().map(|r| r.pixel_count() as usize).sum(),
        island_count: runs.len(),
        singleton_islands: runs.iter().filter(|r| r.pixel_count() == 1).count(),
        anchor_count: runs.len() * 2,
        arc_segments: 0,
        line_segments: runs.len(),
        command_count: commands.len(),
    };

    Toolpath { commands, summary }
}
