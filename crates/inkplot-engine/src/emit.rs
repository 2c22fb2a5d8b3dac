//! Motion emission: turn stroke plans into an ordered command program.
//!
//! The emitter owns the pen state machine (initially up) and the
//! pixel-to-millimeter conversion. Pen commands are only emitted on real
//! transitions, so callers can ask for the pen they need without tracking
//! it themselves.
//!
//! Every program begins with `PenUp` and ends with the configured park
//! move. An empty input therefore yields exactly `[PenUp, park]`.

use crate::arc::ArcFit;
use crate::islands::Island;
use crate::plan::{PlannedSegment, StrokePlan};
use crate::types::{Canvas, IslandOrder, MotionCommand, ParkMove, Point, Scale, SynthesisConfig};

/// Pen state tracked while emitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenState {
    /// Pen lifted; moves are travel.
    Up,
    /// Pen on paper; moves draw.
    Down,
}

/// Coordinate mapping and feeds used by the emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitParams {
    /// Pixel-to-millimeter factors.
    pub scale: Scale,
    /// Plotter bed; needed to mirror Y.
    pub canvas: Canvas,
    /// Mirror the Y axis.
    pub flip_y: bool,
    /// Pen-up feed rate.
    pub travel_feed: f64,
    /// Pen-down feed rate.
    pub draw_feed: f64,
    /// Final move of the program.
    pub park: ParkMove,
}

impl EmitParams {
    /// Emitter parameters for a raster of `scale` under `config`.
    #[must_use]
    pub const fn from_config(config: &SynthesisConfig, scale: Scale) -> Self {
        Self {
            scale,
            canvas: config.canvas,
            flip_y: config.flip_y,
            travel_feed: config.travel_feed,
            draw_feed: config.draw_feed,
            park: config.park,
        }
    }

    /// Convert a pixel-space point to machine millimeters.
    #[must_use]
    pub fn to_mm(&self, p: Point) -> Point {
        let x = p.x * self.scale.x_mm_per_px;
        let y = p.y * self.scale.y_mm_per_px;
        if self.flip_y {
            Point::new(x, self.canvas.height_mm - y)
        } else {
            Point::new(x, y)
        }
    }
}

/// Builds a motion program one stroke at a time.
#[derive(Debug, Clone)]
pub struct MotionEmitter {
    params: EmitParams,
    pen: PenState,
    commands: Vec<MotionCommand>,
}

impl MotionEmitter {
    /// Start a program. The first command is always `PenUp`.
    #[must_use]
    pub fn new(params: EmitParams) -> Self {
        Self {
            params,
            pen: PenState::Up,
            commands: vec![MotionCommand::PenUp],
        }
    }

    /// Current pen state.
    #[must_use]
    pub const fn pen(&self) -> PenState {
        self.pen
    }

    /// Lower the pen if it is up.
    pub fn pen_down(&mut self) {
        if self.pen == PenState::Up {
            self.commands.push(MotionCommand::PenDown);
            self.pen = PenState::Down;
        }
    }

    /// Lift the pen if it is down.
    pub fn pen_up(&mut self) {
        if self.pen == PenState::Down {
            self.commands.push(MotionCommand::PenUp);
            self.pen = PenState::Up;
        }
    }

    /// Lift the pen and move to `target` (pixel space) at travel feed.
    pub fn travel_to(&mut self, target: Point) {
        self.pen_up();
        let p = self.params.to_mm(target);
        self.commands.push(MotionCommand::LinearMove {
            x: p.x,
            y: p.y,
            feed: self.params.travel_feed,
        });
    }

    /// Straight move to `target` (pixel space) at draw feed.
    pub fn line_to(&mut self, target: Point) {
        let p = self.params.to_mm(target);
        self.commands.push(MotionCommand::LinearMove {
            x: p.x,
            y: p.y,
            feed: self.params.draw_feed,
        });
    }

    /// Arc move described by a pixel-space fit, at draw feed.
    pub fn arc_to(&mut self, fit: &ArcFit) {
        let p = self.params.to_mm(fit.end);
        let i = fit.i * self.params.scale.x_mm_per_px;
        let mut j = fit.j * self.params.scale.y_mm_per_px;
        let mut direction = fit.direction;
        if self.params.flip_y {
            j = -j;
            direction = direction.reversed();
        }
        self.commands.push(MotionCommand::ArcMove {
            x: p.x,
            y: p.y,
            i,
            j,
            feed: self.params.draw_feed,
            direction,
        });
    }

    /// Emit one stroke: travel to its start, pen down, each segment, pen up.
    ///
    /// An empty plan emits nothing. A singleton (no segments) still lowers
    /// and lifts the pen, leaving a dot.
    pub fn stroke(&mut self, plan: &StrokePlan) {
        let Some(start) = plan.start() else {
            return;
        };
        self.travel_to(start);
        self.pen_down();
        for segment in plan.segments() {
            match segment {
                PlannedSegment::Line { end } => self.line_to(*end),
                PlannedSegment::Arc(fit) => self.arc_to(fit),
            }
        }
        self.pen_up();
    }

    /// Lift the pen, append the park move and return the program.
    #[must_use]
    pub fn finish(mut self) -> Vec<MotionCommand> {
        self.pen_up();
        match self.params.park {
            ParkMove::Origin => self.commands.push(MotionCommand::LinearMove {
                x: 0.0,
                y: 0.0,
                feed: self.params.travel_feed,
            }),
            ParkMove::Home => self.commands.push(MotionCommand::Home),
        }
        self.commands
    }
}

/// Emit a complete program for `plans`, in the order given.
#[must_use]
pub fn emit_program(plans: &[StrokePlan], params: EmitParams) -> Vec<MotionCommand> {
    let mut emitter = MotionEmitter::new(params);
    for plan in plans {
        emitter.stroke(plan);
    }
    emitter.finish()
}

/// Stable-sort islands by a caller-supplied key.
pub fn order_by<K: Ord>(islands: &mut [Island], key: impl FnMut(&Island) -> K) {
    islands.sort_by_key(key);
}

/// Apply a configured [`IslandOrder`].
pub fn order_islands(islands: &mut [Island], order: IslandOrder) {
    match order {
        IslandOrder::Discovery => {}
        IslandOrder::TopToBottom => order_by(islands, Island::bounding_min),
    }
}
