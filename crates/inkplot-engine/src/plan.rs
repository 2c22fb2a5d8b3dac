//! Per-island stroke planning: simplification followed by arc fitting.
//!
//! An island's raw points are reduced to RDP anchors. Each pair of
//! consecutive anchors bounds a segment of raw points; the segment becomes
//! an arc when those points fit a circle, otherwise a straight line. Arcs
//! therefore never span a breakpoint the simplifier kept.
//!
//! Everything here is in pixel space. Conversion to millimeters happens in
//! the emitter.

use tracing::trace;

use crate::arc::{ArcFit, fit_arc};
use crate::islands::Island;
use crate::simplify::simplify_indices;
use crate::types::Point;

/// How one segment between consecutive anchors is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlannedSegment {
    /// Straight move to the segment's end anchor.
    Line {
        /// End anchor.
        end: Point,
    },
    /// Circular move through the segment's raw points.
    Arc(ArcFit),
}

impl PlannedSegment {
    /// The point this segment finishes at.
    #[must_use]
    pub const fn end(&self) -> Point {
        match self {
            Self::Line { end } => *end,
            Self::Arc(fit) => fit.end,
        }
    }

    /// Returns `true` for arc segments.
    #[must_use]
    pub const fn is_arc(&self) -> bool {
        matches!(self, Self::Arc(_))
    }
}

/// The drawing plan for one island.
///
/// `segments.len()` is `anchors.len() - 1` for non-empty plans. A
/// singleton island has one anchor and no segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokePlan {
    anchors: Vec<Point>,
    segments: Vec<PlannedSegment>,
}

impl StrokePlan {
    /// Plan an island: RDP with `rdp_epsilon`, then arc fitting per segment
    /// when `arc_tolerance` is `Some`.
    #[must_use]
    pub fn from_island(island: &Island, rdp_epsilon: f64, arc_tolerance: Option<f64>) -> Self {
        let points = island.to_polyline().into_points();
        let anchors = simplify_indices(&points, rdp_epsilon);
        Self::from_anchors(&points, &anchors, arc_tolerance)
    }

    /// Plan a point run with explicit anchor indices.
    ///
    /// `anchors` must be ascending indices into `points`. Each segment is
    /// the inclusive slice `points[a..=b]` between consecutive anchors.
    #[must_use]
    pub fn from_anchors(points: &[Point], anchors: &[usize], arc_tolerance: Option<f64>) -> Self {
        let segments = anchors
            .windows(2)
            .filter_map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                let run = points.get(a..=b)?;
                let end = *run.last()?;
                Some(plan_segment(run, end, arc_tolerance))
            })
            .collect();

        Self {
            anchors: anchors.iter().filter_map(|&i| points.get(i).copied()).collect(),
            segments,
        }
    }

    /// Anchor points in drawing order.
    #[must_use]
    pub fn anchors(&self) -> &[Point] {
        &self.anchors
    }

    /// Segments in drawing order.
    #[must_use]
    pub fn segments(&self) -> &[PlannedSegment] {
        &self.segments
    }

    /// Where the stroke begins.
    #[must_use]
    pub fn start(&self) -> Option<Point> {
        self.anchors.first().copied()
    }

    /// Number of arc segments.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_arc()).count()
    }

    /// Number of line segments.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.segments.len() - self.arc_count()
    }
}

fn plan_segment(run: &[Point], end: Point, arc_tolerance: Option<f64>) -> PlannedSegment {
    let Some(tolerance) = arc_tolerance else {
        return PlannedSegment::Line { end };
    };

    match fit_arc(run, tolerance) {
        Some(fit) => {
            trace!(
                points = run.len(),
                radius = fit.radius,
                residual = fit.max_residual,
                "segment fitted as arc"
            );
            PlannedSegment::Arc(fit)
        }
        None => {
            trace!(points = run.len(), "segment kept as line");
            PlannedSegment::Line { end }
        }
    }
}
