//! Shared types for the inkplot toolpath synthesis engine.

use serde::{Deserialize, Serialize};

use crate::strategy::StrategyKind;

/// A 2D point in continuous coordinates.
///
/// Used for geometry (simplification, arc fitting). Pixel-space values
/// are whole numbers; physical-space values are millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl From<PixelPoint> for Point {
    fn from(p: PixelPoint) -> Self {
        Self::new(f64::from(p.x), f64::from(p.y))
    }
}

/// An ink pixel position in raster coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Column (pixels from left edge).
    pub x: u32,
    /// Row (pixels from top edge).
    pub y: u32,
}

impl PixelPoint {
    /// Create a new pixel point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A sequence of connected points forming a path segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// Raster dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Physical drawing area of the plotter in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    /// Bed width in millimeters.
    pub width_mm: f64,
    /// Bed height in millimeters.
    pub height_mm: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width_mm: 115.0,
            height_mm: 115.0,
        }
    }
}

/// Pixel-to-millimeter conversion factors, one per axis.
///
/// Derived as canvas size divided by raster size so the full raster maps
/// onto the full bed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    /// Millimeters per pixel along X.
    pub x_mm_per_px: f64,
    /// Millimeters per pixel along Y.
    pub y_mm_per_px: f64,
}

impl Scale {
    /// Scale that stretches a raster of `dimensions` over `canvas`.
    ///
    /// A zero-sized axis yields a zero factor (there are no pixels to
    /// place on it).
    #[must_use]
    pub fn from_canvas(canvas: Canvas, dimensions: Dimensions) -> Self {
        let axis = |mm: f64, px: u32| {
            if px == 0 { 0.0 } else { mm / f64::from(px) }
        };
        Self {
            x_mm_per_px: axis(canvas.width_mm, dimensions.width),
            y_mm_per_px: axis(canvas.height_mm, dimensions.height),
        }
    }

    /// A bed length in pixels, measured along the coarser axis.
    ///
    /// Any two pixels within the result are at most `mm` apart on the bed,
    /// whichever direction separates them. Zero for an empty raster.
    #[must_use]
    pub fn mm_to_px(&self, mm: f64) -> f64 {
        let coarse = self.x_mm_per_px.max(self.y_mm_per_px);
        if coarse > 0.0 { mm / coarse } else { 0.0 }
    }
}

/// Rotational sense of an arc move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcDirection {
    /// Clockwise arc (`G2`).
    Clockwise,
    /// Counter-clockwise arc (`G3`).
    CounterClockwise,
}

impl ArcDirection {
    /// The G-code word for this direction.
    #[must_use]
    pub const fn gcode_word(self) -> &'static str {
        match self {
            Self::Clockwise => "G2",
            Self::CounterClockwise => "G3",
        }
    }

    /// The opposite rotational sense.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// One step of a plotter motion program.
///
/// Coordinates are absolute millimeters; `i`/`j` are arc-center offsets
/// relative to the move's start point. Feed rates are mm/min.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionCommand {
    /// Return to the machine home position (`G28`).
    Home,
    /// Lift the pen (`M5`).
    PenUp,
    /// Lower the pen (`M3`).
    PenDown,
    /// Straight move (`G1`).
    LinearMove {
        /// Target X.
        x: f64,
        /// Target Y.
        y: f64,
        /// Feed rate.
        feed: f64,
    },
    /// Circular move (`G2`/`G3`).
    ArcMove {
        /// Target X.
        x: f64,
        /// Target Y.
        y: f64,
        /// Center X offset from the start point.
        i: f64,
        /// Center Y offset from the start point.
        j: f64,
        /// Feed rate.
        feed: f64,
        /// Rotational sense.
        direction: ArcDirection,
    },
}

/// Order in which islands are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IslandOrder {
    /// Keep raster-scan discovery order.
    #[default]
    Discovery,
    /// Sort by bounding-box minimum Y, then minimum X.
    TopToBottom,
}

/// Final move appended after the last island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParkMove {
    /// Linear travel move to `X0 Y0`.
    #[default]
    Origin,
    /// Machine homing cycle (`G28`).
    Home,
}

/// Mechanical parameters of the plotter's drive train.
///
/// Used to pick a processing resolution that does not exceed what the
/// machine can physically resolve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineProfile {
    /// Motor steps per output shaft revolution (after gearing).
    pub steps_per_rev: f64,
    /// Belt tooth pitch in millimeters.
    pub belt_pitch_mm: f64,
    /// Teeth on the drive pulley.
    pub pulley_teeth: f64,
    /// Desired processing resolution in dots per inch.
    pub target_dpi: f64,
}

impl MachineProfile {
    /// 28BYJ-48 style stepper in half-step mode.
    pub const DEFAULT_STEPS_PER_REV: f64 = 4096.0;
    /// GT2 belt.
    pub const DEFAULT_BELT_PITCH_MM: f64 = 2.0;
    /// Default pulley tooth count.
    pub const DEFAULT_PULLEY_TEETH: f64 = 20.0;
    /// Default target processing resolution.
    pub const DEFAULT_TARGET_DPI: f64 = 600.0;

    /// Physical steps per millimeter of carriage travel.
    #[must_use]
    pub fn steps_per_mm(&self) -> f64 {
        self.steps_per_rev / (self.pulley_teeth * self.belt_pitch_mm)
    }

    /// The machine's native resolution in dots per inch.
    #[must_use]
    pub fn machine_dpi(&self) -> f64 {
        self.steps_per_mm() * 25.4
    }

    /// Processing resolution: the target DPI, capped by the machine DPI.
    #[must_use]
    pub fn processing_dpi(&self) -> f64 {
        self.machine_dpi().min(self.target_dpi)
    }

    /// Raster pixels per millimeter at the processing resolution.
    #[must_use]
    pub fn pixels_per_mm(&self) -> f64 {
        self.processing_dpi() / 25.4
    }
}

impl Default for MachineProfile {
    fn default() -> Self {
        Self {
            steps_per_rev: Self::DEFAULT_STEPS_PER_REV,
            belt_pitch_mm: Self::DEFAULT_BELT_PITCH_MM,
            pulley_teeth: Self::DEFAULT_PULLEY_TEETH,
            target_dpi: Self::DEFAULT_TARGET_DPI,
        }
    }
}

/// Configuration for a synthesis run.
///
/// All lengths suffixed `_px` are in raster pixels; `_mm` in millimeters.
/// Call [`validate`](Self::validate) (done by [`crate::synthesize`]) before
/// use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Resolution the source image is rasterized at before synthesis.
    ///
    /// The engine itself converts between pixels and millimeters with the
    /// [`Scale`] of canvas over raster size; a raster prepared at this
    /// resolution to fill the canvas makes the two agree.
    pub pixels_per_mm: f64,

    /// Plotter bed the raster is stretched over.
    pub canvas: Canvas,

    /// Maximum distance for linking two ink points into one stroke.
    pub search_radius_mm: f64,

    /// How many nearest neighbours each traversal step considers.
    pub neighbour_count: usize,

    /// Ramer-Douglas-Peucker tolerance.
    pub rdp_epsilon_px: f64,

    /// Maximum residual between a fitted circle and its points.
    pub arc_tolerance_px: f64,

    /// Whether to attempt arc fitting at all.
    pub arc_fitting: bool,

    /// Pen-up feed rate (mm/min).
    pub travel_feed: f64,

    /// Pen-down feed rate (mm/min).
    pub draw_feed: f64,

    /// Island drawing order.
    pub island_order: IslandOrder,

    /// Mirror the Y axis so that raster row 0 maps to the far edge of the bed.
    pub flip_y: bool,

    /// Final move of the program.
    pub park: ParkMove,

    /// Which toolpath strategy produces the program.
    pub strategy: StrategyKind,

    /// Pen nib width; the scanline spacing of the serpentine strategy.
    pub pen_nib_mm: f64,

    /// Notify the observer every this many visited points (0 disables).
    pub progress_interval: usize,
}

impl SynthesisConfig {
    /// Default island linking cutoff.
    pub const DEFAULT_SEARCH_RADIUS_MM: f64 = 5.0;
    /// Default `k` for nearest-neighbour queries.
    pub const DEFAULT_NEIGHBOUR_COUNT: usize = 10;
    /// Default RDP tolerance.
    pub const DEFAULT_RDP_EPSILON_PX: f64 = 2.0;
    /// Default arc residual tolerance.
    pub const DEFAULT_ARC_TOLERANCE_PX: f64 = 1.0;
    /// Default pen-up feed rate.
    pub const DEFAULT_TRAVEL_FEED: f64 = 5000.0;
    /// Default pen-down feed rate.
    pub const DEFAULT_DRAW_FEED: f64 = 2000.0;
    /// Default pen nib width.
    pub const DEFAULT_PEN_NIB_MM: f64 = 0.5;

    /// Search radius in raster pixels under the run's `scale`.
    #[must_use]
    pub fn search_radius_px(&self, scale: Scale) -> f64 {
        scale.mm_to_px(self.search_radius_mm)
    }

    /// Check that every numeric field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), EngineError> {
        let positive = [
            ("pixels_per_mm", self.pixels_per_mm),
            ("canvas.width_mm", self.canvas.width_mm),
            ("canvas.height_mm", self.canvas.height_mm),
            ("travel_feed", self.travel_feed),
            ("draw_feed", self.draw_feed),
            ("pen_nib_mm", self.pen_nib_mm),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("search_radius_mm", self.search_radius_mm),
            ("rdp_epsilon_px", self.rdp_epsilon_px),
            ("arc_tolerance_px", self.arc_tolerance_px),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        if self.neighbour_count == 0 {
            return Err(EngineError::InvalidConfig(
                "neighbour_count must be at least 1".to_owned(),
            ));
        }

        Ok(())
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            pixels_per_mm: MachineProfile::default().pixels_per_mm(),
            canvas: Canvas::default(),
            search_radius_mm: Self::DEFAULT_SEARCH_RADIUS_MM,
            neighbour_count: Self::DEFAULT_NEIGHBOUR_COUNT,
            rdp_epsilon_px: Self::DEFAULT_RDP_EPSILON_PX,
            arc_tolerance_px: Self::DEFAULT_ARC_TOLERANCE_PX,
            arc_fitting: true,
            travel_feed: Self::DEFAULT_TRAVEL_FEED,
            draw_feed: Self::DEFAULT_DRAW_FEED,
            island_order: IslandOrder::default(),
            flip_y: false,
            park: ParkMove::default(),
            strategy: StrategyKind::default(),
            pen_nib_mm: Self::DEFAULT_PEN_NIB_MM,
            progress_interval: 0,
        }
    }
}

/// Errors raised while constructing engine inputs.
///
/// Synthesis itself never fails: degenerate geometry falls back to
/// simpler output instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Pixel buffer length does not match the declared dimensions.
    #[error("raster is {width}x{height} but has {actual} pixels (expected {expected})")]
    InvalidRaster {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// `width * height`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// Synthesis configuration is invalid.
    #[error("invalid synthesis configuration: {0}")]
    InvalidConfig(String),
}
