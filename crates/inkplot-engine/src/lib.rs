//! inkplot-engine: Pure toolpath synthesis for pen plotters (sans-IO).
//!
//! Converts a bilevel raster into a motion program through:
//! ink points -> spatial index -> island traversal -> RDP simplification
//! -> arc fitting -> motion emission.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! rasters and returns structured data. Text serialization lives in
//! `inkplot-export`; file handling in `inkplot-cli`.

pub mod analyze;
pub mod arc;
pub mod diagnostics;
pub mod emit;
pub mod islands;
pub mod observer;
pub mod plan;
pub mod raster;
pub mod scan;
pub mod simplify;
pub mod spatial;
pub mod strategy;
pub mod types;

use tracing::debug;

pub use analyze::{PathMetrics, analyze};
pub use diagnostics::{SynthesisSummary, Toolpath};
pub use observer::{NoopObserver, SynthesisObserver, TracingObserver};
pub use raster::{Bitmap, PointSet};
pub use strategy::{StrategyKind, ToolpathStrategy};
pub use types::{
    ArcDirection, Canvas, Dimensions, EngineError, IslandOrder, MachineProfile, MotionCommand,
    ParkMove, PixelPoint, Point, Polyline, Scale, SynthesisConfig,
};

/// Run toolpath synthesis on a bilevel raster.
///
/// # Steps (island strategy)
///
/// 1. Extract ink points in row-major order
/// 2. Build the spatial index
/// 3. Trace islands by greedy nearest-neighbour walk
/// 4. Optionally re-order islands
/// 5. Simplify each island (Ramer-Douglas-Peucker)
/// 6. Fit arcs between consecutive anchors
/// 7. Emit the motion program, ending with the park move
///
/// An all-paper raster is not an error: it yields `[PenUp, park]`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if `config` fails validation.
pub fn synthesize(bitmap: &Bitmap, config: &SynthesisConfig) -> Result<Toolpath, EngineError> {
    synthesize_with_observer(bitmap, config, &mut NoopObserver)
}

/// Like [`synthesize`], reporting progress to `observer`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if `config` fails validation.
pub fn synthesize_with_observer(
    bitmap: &Bitmap,
    config: &SynthesisConfig,
    observer: &mut dyn SynthesisObserver,
) -> Result<Toolpath, EngineError> {
    config.validate()?;

    let toolpath = config.strategy.synthesize(bitmap, config, observer);

    let s = &toolpath.summary;
    debug!(
        strategy = ?s.strategy,
        points = s.point_count,
        islands = s.island_count,
        anchors = s.anchor_count,
        arcs = s.arc_segments,
        lines = s.line_segments,
        commands = s.command_count,
        "synthesis complete"
    );

    Ok(toolpath)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_raster_is_trivial_program() {
        let bitmap = Bitmap::from_fn(10, 10, |_, _| false);
        let toolpath = synthesize(&bitmap, &SynthesisConfig::default()).unwrap();
        assert_eq!(
            toolpath.commands,
            vec![
                MotionCommand::PenUp,
                MotionCommand::LinearMove {
                    x: 0.0,
                    y: 0.0,
                    feed: SynthesisConfig::DEFAULT_TRAVEL_FEED,
                },
            ]
        );
        assert_eq!(toolpath.summary.island_count, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bitmap = Bitmap::from_fn(1, 1, |_, _| true);
        let config = SynthesisConfig {
            draw_feed: -1.0,
            ..SynthesisConfig::default()
        };
        assert!(matches!(
            synthesize(&bitmap, &config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn observer_is_notified() {
        #[derive(Default)]
        struct Count(usize);
        impl SynthesisObserver for Count {
            fn island_completed(&mut self, _index: usize, _point_count: usize) {
                self.0 += 1;
            }
        }

        let bitmap = Bitmap::from_fn(200, 10, |x, y| y == 5 && (x == 0 || x == 199));
        let config = SynthesisConfig {
            pixels_per_mm: 1.0,
            ..SynthesisConfig::default()
        };
        let mut count = Count::default();
        let toolpath = synthesize_with_observer(&bitmap, &config, &mut count).unwrap();
        assert_eq!(count.0, 2);
        assert_eq!(toolpath.summary.island_count, 2);
    }
}
