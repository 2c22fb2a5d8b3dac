//! Synthesis output and its summary counts.

use serde::{Deserialize, Serialize};

use crate::strategy::StrategyKind;
use crate::types::MotionCommand;

/// The result of one synthesis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Toolpath {
    /// Motion program in execution order.
    pub commands: Vec<MotionCommand>,
    /// How the program was built.
    pub summary: SynthesisSummary,
}

/// High-level counts for one synthesis run.
///
/// For the serpentine strategy each scan run counts as an island with
/// two anchors and one line segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisSummary {
    /// Strategy that produced the program.
    pub strategy: StrategyKind,
    /// Raster width in pixels.
    pub image_width: u32,
    /// Raster height in pixels.
    pub image_height: u32,
    /// Ink points drawn.
    pub point_count: usize,
    /// Strokes drawn.
    pub island_count: usize,
    /// Strokes of a single point.
    pub singleton_islands: usize,
    /// Anchors kept by simplification.
    pub anchor_count: usize,
    /// Segments emitted as arcs.
    pub arc_segments: usize,
    /// Segments emitted as straight lines.
    pub line_segments: usize,
    /// Commands in the program.
    pub command_count: usize,
}

impl SynthesisSummary {
    /// Format the summary as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Synthesis Summary\n{}", "=".repeat(40)));
        lines.push(format!("Strategy: {:?}", self.strategy));
        lines.push(format!(
            "Image: {}x{} ({} ink points)",
            self.image_width, self.image_height, self.point_count,
        ));

        #[allow(clippy::cast_precision_loss)]
        let mean = if self.island_count > 0 {
            self.point_count as f64 / self.island_count as f64
        } else {
            0.0
        };
        lines.push(format!(
            "Islands: {} ({} singletons, {mean:.1} points avg)",
            self.island_count, self.singleton_islands,
        ));

        let segments = self.arc_segments + self.line_segments;
        lines.push(format!(
            "Anchors: {}  |  Segments: {segments} ({} arcs, {} lines)",
            self.anchor_count, self.arc_segments, self.line_segments,
        ));
        lines.push(format!("Commands: {}", self.command_count));

        lines.join("\n")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn summary() -> SynthesisSummary {
        SynthesisSummary {
            strategy: StrategyKind::Islands,
            image_width: 100,
            image_height: 50,
            point_count: 40,
            island_count: 4,
            singleton_islands: 1,
            anchor_count: 12,
            arc_segments: 3,
            line_segments: 5,
            command_count: 22,
        }
    }

    #[test]
    fn report_lists_counts() {
        let report = summary().report();
        assert!(report.contains("Image: 100x50 (40 ink points)"));
        assert!(report.contains("Islands: 4 (1 singletons, 10.0 points avg)"));
        assert!(report.contains("Segments: 8 (3 arcs, 5 lines)"));
        assert!(report.contains("Commands: 22"));
    }

    #[test]
    fn report_handles_no_islands() {
        let empty = SynthesisSummary {
            point_count: 0,
            island_count: 0,
            ..summary()
        };
        assert!(empty.report().contains("0.0 points avg"));
    }

    #[test]
    fn summary_serializes() {
        let json = serde_json::to_string(&summary()).unwrap();
        assert!(json.contains("\"strategy\":\"Islands\""));
        let back: SynthesisSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary());
    }
}
