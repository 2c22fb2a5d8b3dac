//! Toolpath strategies: how a raster becomes a motion program.
//!
//! [`ToolpathStrategy`] is the pluggable seam and [`StrategyKind`] selects
//! an implementation at runtime from configuration.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{SynthesisSummary, Toolpath};
use crate::emit::{EmitParams, emit_program, order_islands};
use crate::islands::{TraversalParams, trace_islands};
use crate::observer::SynthesisObserver;
use crate::plan::StrokePlan;
use crate::raster::{Bitmap, PointSet};
use crate::scan;
use crate::spatial::SpatialIndex;
use crate::types::{Scale, SynthesisConfig};

/// Selects which toolpath strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Trace ink into nearest-neighbour islands, simplify each with RDP
    /// and fit arcs where the points are circular.
    ///
    /// Produces outline-like strokes with few pen lifts.
    #[default]
    Islands,

    /// Scan rows spaced one pen nib apart in alternating directions and
    /// draw every horizontal run of ink.
    ///
    /// Fills solid regions; ignores the island, RDP and arc settings.
    Serpentine,
}

/// Trait for toolpath strategies.
///
/// Input: a validated configuration and a bilevel raster.
/// Output: the motion program and a summary of how it was built.
pub trait ToolpathStrategy {
    /// Build a motion program for `bitmap`.
    fn synthesize(
        &self,
        bitmap: &Bitmap,
        config: &SynthesisConfig,
        observer: &mut dyn SynthesisObserver,
    ) -> Toolpath;
}

impl ToolpathStrategy for StrategyKind {
    fn synthesize(
        &self,
        bitmap: &Bitmap,
        config: &SynthesisConfig,
        observer: &mut dyn SynthesisObserver,
    ) -> Toolpath {
        match *self {
            Self::Islands => synthesize_islands(bitmap, config, observer),
            Self::Serpentine => scan::serpentine(bitmap, config, observer),
        }
    }
}

fn synthesize_islands(
    bitmap: &Bitmap,
    config: &SynthesisConfig,
    observer: &mut dyn SynthesisObserver,
) -> Toolpath {
    let dimensions = bitmap.dimensions();
    let scale = Scale::from_canvas(config.canvas, dimensions);

    let points = PointSet::from_bitmap(bitmap);
    let index = SpatialIndex::build(&points);

    let params = TraversalParams {
        neighbour_count: config.neighbour_count,
        search_radius_px: config.search_radius_px(scale),
        progress_interval: config.progress_interval,
    };
    let mut islands = trace_islands(&points, &index, params, observer);
    order_islands(&mut islands, config.island_order);

    let arc_tolerance = config.arc_fitting.then_some(config.arc_tolerance_px);
    let plans: Vec<StrokePlan> = islands
        .iter()
        .map(|island| StrokePlan::from_island(island, config.rdp_epsilon_px, arc_tolerance))
        .collect();

    let commands = emit_program(&plans, EmitParams::from_config(config, scale));

    let summary = SynthesisSummary {
        strategy: StrategyKind::Islands,
        image_width: dimensions.width,
        image_height: dimensions.height,
        point_count: points.len(),
        island_count: islands.len(),
        singleton_islands: islands.iter().filter(|i| i.len() == 1).count(),
        anchor_count: plans.iter().map(|p| p.anchors().len()).sum(),
        arc_segments: plans.iter().map(StrokePlan::arc_count).sum(),
        line_segments: plans.iter().map(StrokePlan::line_count).sum(),
        command_count: commands.len(),
    };

    Toolpath { commands, summary }
}
