//! Path analysis: replay a motion program and measure it.
//!
//! Distances are attributed to drawing or travel by the pen state at the
//! time of each move. The replay starts at the origin with the pen up.

use serde::{Deserialize, Serialize};

use crate::types::{MotionCommand, Point};

/// Quality metrics for one motion program.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PathMetrics {
    /// Distance moved with the pen down, in millimeters.
    pub draw_distance_mm: f64,
    /// Distance moved with the pen up, in millimeters.
    pub travel_distance_mm: f64,
    /// `draw / (draw + travel) * 100`, or 0 when nothing moved.
    pub efficiency_pct: f64,
    /// Number of down-to-up pen transitions.
    pub pen_lifts: usize,
    /// Total commands in the program.
    pub command_count: usize,
    /// Sum of `distance / feed` over all moves, in minutes.
    pub estimated_minutes: f64,
}

impl PathMetrics {
    /// Total distance moved.
    #[must_use]
    pub fn total_distance_mm(&self) -> f64 {
        self.draw_distance_mm + self.travel_distance_mm
    }

    /// Format metrics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        [
            format!("Draw distance:   {:.2} mm", self.draw_distance_mm),
            format!("Travel distance: {:.2} mm", self.travel_distance_mm),
            format!("Efficiency:      {:.2}%", self.efficiency_pct),
            format!("Pen lifts:       {}", self.pen_lifts),
            format!("Commands:        {}", self.command_count),
            format!("Estimated time:  {:.2} min", self.estimated_minutes),
        ]
        .join("\n")
    }

    fn accumulate(&mut self, distance: f64, feed: Option<f64>, drawing: bool) {
        if drawing {
            self.draw_distance_mm += distance;
        } else {
            self.travel_distance_mm += distance;
        }
        if let Some(feed) = feed.filter(|f| *f > 0.0) {
            self.estimated_minutes += distance / feed;
        }
    }
}

/// Length of an arc from `start` to `end` around a center at offset
/// `(i, j)` from `start`.
///
/// Uses the minor-arc angle `2 * asin(chord / 2r)`. When the radius does
/// not exceed half the chord the arc is degenerate and the chord is used.
#[must_use]
pub fn arc_length(start: Point, end: Point, i: f64, j: f64) -> f64 {
    let radius = i.hypot(j);
    let chord = start.distance(end);
    if radius <= chord / 2.0 {
        return chord;
    }
    2.0 * (chord / (2.0 * radius)).asin() * radius
}

/// Replay `commands` and compute their metrics.
#[must_use]
pub fn analyze(commands: &[MotionCommand]) -> PathMetrics {
    let mut pen_down = false;
    let mut position = Point::new(0.0, 0.0);
    let mut last_feed: Option<f64> = None;
    let mut metrics = PathMetrics {
        command_count: commands.len(),
        ..PathMetrics::default()
    };

    for command in commands {
        match *command {
            MotionCommand::PenDown => pen_down = true,
            MotionCommand::PenUp => {
                if pen_down {
                    metrics.pen_lifts += 1;
                }
                pen_down = false;
            }
            MotionCommand::LinearMove { x, y, feed } => {
                let target = Point::new(x, y);
                metrics.accumulate(position.distance(target), Some(feed), pen_down);
                position = target;
                last_feed = Some(feed);
            }
            MotionCommand::ArcMove {
                x, y, i, j, feed, ..
            } => {
                let target = Point::new(x, y);
                metrics.accumulate(arc_length(position, target, i, j), Some(feed), pen_down);
                position = target;
                last_feed = Some(feed);
            }
            MotionCommand::Home => {
                let origin = Point::new(0.0, 0.0);
                metrics.accumulate(position.distance(origin), last_feed, false);
                position = origin;
            }
        }
    }

    let total = metrics.total_distance_mm();
    metrics.efficiency_pct = if total > 0.0 {
        metrics.draw_distance_mm / total * 100.0
    } else {
        0.0
    };
    metrics
}
