//! PNG preview of a motion program.
//!
//! Draw moves are stroked red and travel moves blue on a white bed, so
//! wasted pen-up motion is visible at a glance.

use std::f64::consts::TAU;

use inkplot_engine::{ArcDirection, Canvas, MotionCommand};
use tiny_skia::{Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Preview pixels per bed millimeter.
pub const DEFAULT_PREVIEW_SCALE: f64 = 4.0;

/// Chords per full turn when flattening arcs.
const ARC_STEPS_PER_TURN: f64 = 72.0;

/// Render `commands` onto a `canvas`-sized image.
///
/// With `flip_y` the program's Y axis points up the bed, so it is mirrored
/// back into image rows. Returns `None` if the canvas rounds to an empty
/// image.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_preview(
    commands: &[MotionCommand],
    canvas: Canvas,
    scale: f64,
    flip_y: bool,
) -> Option<Pixmap> {
    let width = (canvas.width_mm * scale).ceil().max(1.0) as u32;
    let height = (canvas.height_mm * scale).ceil().max(1.0) as u32;
    let mut pixmap = Pixmap::new(width, height)?;
    pixmap.fill(Color::WHITE);

    let to_px = |x: f64, y: f64| {
        let y = if flip_y { canvas.height_mm - y } else { y };
        ((x * scale) as f32, (y * scale) as f32)
    };

    let mut draw = PathBuilder::new();
    let mut travel = PathBuilder::new();
    let mut pen_down = false;
    let (mut cx, mut cy) = (0.0, 0.0);

    for command in commands {
        let target = if pen_down { &mut draw } else { &mut travel };
        match *command {
            MotionCommand::PenDown => pen_down = true,
            MotionCommand::PenUp => pen_down = false,
            MotionCommand::Home => {
                segment(target, to_px(cx, cy), &[to_px(0.0, 0.0)]);
                (cx, cy) = (0.0, 0.0);
            }
            MotionCommand::LinearMove { x, y, .. } => {
                segment(target, to_px(cx, cy), &[to_px(x, y)]);
                (cx, cy) = (x, y);
            }
            MotionCommand::ArcMove {
                x, y, i, j, direction, ..
            } => {
                let points: Vec<(f32, f32)> = flatten_arc((cx, cy), (x, y), (i, j), direction)
                    .into_iter()
                    .map(|(px, py)| to_px(px, py))
                    .collect();
                segment(target, to_px(cx, cy), &points);
                (cx, cy) = (x, y);
            }
        }
    }

    let line_width = (scale * 0.5).max(1.0) as f32;
    stroke(&mut pixmap, travel, [40, 90, 220, 160], line_width * 0.5);
    stroke(&mut pixmap, draw, [220, 30, 30, 255], line_width);
    Some(pixmap)
}

fn segment(pb: &mut PathBuilder, from: (f32, f32), to: &[(f32, f32)]) {
    pb.move_to(from.0, from.1);
    for &(x, y) in to {
        pb.line_to(x, y);
    }
}

fn stroke(pixmap: &mut Pixmap, pb: PathBuilder, [r, g, b, a]: [u8; 4], width: f32) {
    let Some(path) = pb.finish() else {
        return;
    };

    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Points along an arc from `start` to `end` about `start + offset`,
/// ending exactly at `end`. Coincident endpoints sweep a full turn.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn flatten_arc(
    start: (f64, f64),
    end: (f64, f64),
    offset: (f64, f64),
    direction: ArcDirection,
) -> Vec<(f64, f64)> {
    let center = (start.0 + offset.0, start.1 + offset.1);
    let radius = offset.0.hypot(offset.1);
    let a0 = (start.1 - center.1).atan2(start.0 - center.0);
    let a1 = (end.1 - center.1).atan2(end.0 - center.0);

    let mut sweep = a1 - a0;
    match direction {
        ArcDirection::CounterClockwise if sweep <= 0.0 => sweep += TAU,
        ArcDirection::Clockwise if sweep >= 0.0 => sweep -= TAU,
        _ => {}
    }

    let steps = (sweep.abs() / TAU * ARC_STEPS_PER_TURN).ceil().max(1.0) as usize;
    let mut points: Vec<(f64, f64)> = (1..steps)
        .map(|k| {
            let a = (sweep * k as f64).mul_add(1.0 / steps as f64, a0);
            (radius.mul_add(a.cos(), center.0), radius.mul_add(a.sin(), center.1))
        })
        .collect();
    points.push(end);
    points
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn canvas(size: f64) -> Canvas {
        Canvas {
            width_mm: size,
            height_mm: size,
        }
    }

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8) {
        let p = pixmap.pixel(x, y).unwrap();
        (p.red(), p.green(), p.blue())
    }

    #[test]
    fn empty_program_is_white() {
        let pixmap = render_preview(&[], canvas(10.0), 2.0, false).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (20, 20));
        assert_eq!(pixel(&pixmap, 10, 10), (255, 255, 255));
    }

    #[test]
    fn draw_moves_are_red() {
        let program = [
            MotionCommand::PenUp,
            MotionCommand::LinearMove {
                x: 2.0,
                y: 5.0,
                feed: 5000.0,
            },
            MotionCommand::PenDown,
            MotionCommand::LinearMove {
                x: 8.0,
                y: 5.0,
                feed: 2000.0,
            },
            MotionCommand::PenUp,
        ];
        let pixmap = render_preview(&program, canvas(10.0), 4.0, false).unwrap();
        let (r, g, b) = pixel(&pixmap, 20, 20);
        assert!(r > 150 && g < 100 && b < 100, "got {r},{g},{b}");
    }

    #[test]
    fn flip_y_mirrors_rows() {
        let program = [
            MotionCommand::PenDown,
            MotionCommand::LinearMove {
                x: 10.0,
                y: 1.0,
                feed: 2000.0,
            },
        ];
        let pixmap = render_preview(&program, canvas(10.0), 4.0, true).unwrap();
        // Drawn from (0,0) to (10,1) in bed space: the bottom image rows.
        let (_, g, _) = pixel(&pixmap, 20, 37);
        assert!(g < 100);
        assert_eq!(pixel(&pixmap, 20, 2), (255, 255, 255));
    }

    #[test]
    fn quarter_arc_stays_on_circle() {
        let points = flatten_arc(
            (10.0, 0.0),
            (0.0, 10.0),
            (-10.0, 0.0),
            ArcDirection::CounterClockwise,
        );
        assert_eq!(points.last().copied(), Some((0.0, 10.0)));
        assert_eq!(points.len(), 18);
        for (x, y) in points {
            assert!((x.hypot(y) - 10.0).abs() < 1e-9);
            assert!(x >= -1e-9 && y >= -1e-9);
        }
    }

    #[test]
    fn clockwise_arc_takes_the_long_way() {
        let points = flatten_arc(
            (10.0, 0.0),
            (0.0, 10.0),
            (-10.0, 0.0),
            ArcDirection::Clockwise,
        );
        assert!(points.len() >= 54);
        assert!(points.iter().any(|&(_, y)| y < -9.0));
    }

    #[test]
    fn closed_arc_is_a_full_turn() {
        let points = flatten_arc(
            (5.0, 0.0),
            (5.0, 0.0),
            (-5.0, 0.0),
            ArcDirection::CounterClockwise,
        );
        assert_eq!(points.len(), 72);
    }
}
