//! Integration tests: end-to-end synthesis on small hand-built rasters.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::f64::consts::PI;

use inkplot_engine::emit::{EmitParams, emit_program};
use inkplot_engine::plan::StrokePlan;
use inkplot_engine::{
    ArcDirection, Bitmap, Canvas, MotionCommand, ParkMove, Point, Scale, SynthesisConfig, analyze,
    synthesize,
};

/// One millimeter per pixel on a `size` x `size` raster.
fn unit_config(size: u32) -> SynthesisConfig {
    let size = f64::from(size);
    SynthesisConfig {
        pixels_per_mm: 1.0,
        canvas: Canvas {
            width_mm: size,
            height_mm: size,
        },
        ..SynthesisConfig::default()
    }
}

fn travel(x: f64, y: f64) -> MotionCommand {
    MotionCommand::LinearMove {
        x,
        y,
        feed: SynthesisConfig::DEFAULT_TRAVEL_FEED,
    }
}

fn draw(x: f64, y: f64) -> MotionCommand {
    MotionCommand::LinearMove {
        x,
        y,
        feed: SynthesisConfig::DEFAULT_DRAW_FEED,
    }
}

#[test]
fn straight_diagonal_is_one_line() {
    let bitmap = Bitmap::from_fn(20, 20, |x, y| x == y && (5..=15).contains(&x));
    let toolpath = synthesize(&bitmap, &unit_config(20)).unwrap();

    assert_eq!(toolpath.summary.point_count, 11);
    assert_eq!(toolpath.summary.island_count, 1);
    assert_eq!(toolpath.summary.anchor_count, 2);
    assert_eq!(toolpath.summary.arc_segments, 0);
    assert_eq!(
        toolpath.commands,
        vec![
            MotionCommand::PenUp,
            travel(5.0, 5.0),
            MotionCommand::PenDown,
            draw(15.0, 15.0),
            MotionCommand::PenUp,
            travel(0.0, 0.0),
        ]
    );
}

#[test]
fn sixteen_point_circle_is_one_arc() {
    let points: Vec<Point> = (0..16)
        .map(|k| {
            let a = 2.0 * PI * f64::from(k) / 16.0;
            Point::new(5.0f64.mul_add(a.cos(), 20.0), 5.0f64.mul_add(a.sin(), 20.0))
        })
        .collect();
    let plan = StrokePlan::from_anchors(&points, &[0, 15], Some(1.0));
    let params = EmitParams {
        scale: Scale {
            x_mm_per_px: 1.0,
            y_mm_per_px: 1.0,
        },
        canvas: Canvas::default(),
        flip_y: false,
        travel_feed: 5000.0,
        draw_feed: 2000.0,
        park: ParkMove::Origin,
    };
    let commands = emit_program(&[plan], params);

    let arcs: Vec<&MotionCommand> = commands
        .iter()
        .filter(|c| matches!(c, MotionCommand::ArcMove { .. }))
        .collect();
    assert_eq!(arcs.len(), 1, "commands: {commands:?}");
    assert!(
        !commands
            .iter()
            .any(|c| matches!(c, MotionCommand::LinearMove { feed, .. } if (*feed - 2000.0).abs() < f64::EPSILON)),
        "no straight draw moves expected"
    );

    let MotionCommand::ArcMove {
        x,
        y,
        i,
        j,
        direction,
        ..
    } = *arcs[0]
    else {
        unreachable!();
    };
    // (mid - first) x (last - first) is positive for this sweep.
    assert_eq!(direction, ArcDirection::CounterClockwise);
    assert_eq!(direction.gcode_word(), "G3");
    assert!((i.hypot(j) - 5.0).abs() <= 1.0);
    assert!((x - points[15].x).abs() < 1e-9);
    assert!((y - points[15].y).abs() < 1e-9);
}

#[test]
fn distant_blobs_are_separate_strokes() {
    let bitmap = Bitmap::from_fn(40, 40, |x, y| {
        ((2..5).contains(&x) && (2..5).contains(&y)) || ((30..33).contains(&x) && (30..33).contains(&y))
    });
    let toolpath = synthesize(&bitmap, &unit_config(40)).unwrap();
    assert_eq!(toolpath.summary.island_count, 2);

    let commands = &toolpath.commands;
    let downs: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter_map(|(i, c)| matches!(c, MotionCommand::PenDown).then_some(i))
        .collect();
    assert_eq!(downs.len(), 2);

    // Between the two strokes: lift, then a travel move to the second blob.
    let between = &commands[downs[0]..downs[1]];
    let lift = between
        .iter()
        .position(|c| matches!(c, MotionCommand::PenUp))
        .expect("pen lifted between strokes");
    assert_eq!(between.len() - 1, lift + 1, "travel follows the lift");
    assert!(matches!(
        commands[downs[1] - 1],
        MotionCommand::LinearMove { x, y, feed }
            if x >= 30.0 && y >= 30.0 && (feed - SynthesisConfig::DEFAULT_TRAVEL_FEED).abs() < f64::EPSILON
    ));

    let metrics = analyze(commands);
    assert_eq!(metrics.pen_lifts, 2);
}

#[test]
fn blank_raster_is_pen_up_and_origin() {
    let bitmap = Bitmap::from_fn(16, 16, |_, _| false);
    let toolpath = synthesize(&bitmap, &unit_config(16)).unwrap();
    assert_eq!(
        toolpath.commands,
        vec![MotionCommand::PenUp, travel(0.0, 0.0)]
    );

    let metrics = analyze(&toolpath.commands);
    assert!(metrics.draw_distance_mm.abs() < f64::EPSILON);
    assert!(metrics.efficiency_pct.abs() < f64::EPSILON);
}

#[test]
fn known_distances_give_two_thirds_efficiency() {
    let program = [
        MotionCommand::PenUp,
        travel(0.0, 5.0),
        MotionCommand::PenDown,
        draw(10.0, 5.0),
        MotionCommand::PenUp,
    ];
    let metrics = analyze(&program);
    assert_eq!(format!("{:.2}", metrics.efficiency_pct), "66.67");
}

#[test]
fn ring_uses_arcs_by_default() {
    let bitmap = Bitmap::from_fn(60, 60, |x, y| {
        let d = (f64::from(x) - 30.0).hypot(f64::from(y) - 30.0);
        (d - 20.0).abs() < 0.5
    });
    let toolpath = synthesize(&bitmap, &unit_config(60)).unwrap();
    assert!(toolpath.summary.island_count >= 1);
    assert!(toolpath.summary.arc_segments > 0);
    assert!(
        toolpath
            .commands
            .iter()
            .any(|c| matches!(c, MotionCommand::ArcMove { .. }))
    );
    let metrics = analyze(&toolpath.commands);
    assert!(metrics.draw_distance_mm > 0.0);
    assert!((0.0..=100.0).contains(&metrics.efficiency_pct));
}

#[test]
fn flip_y_mirrors_the_program() {
    let bitmap = Bitmap::from_fn(20, 20, |x, y| y == 2 && (4..=12).contains(&x));
    let config = SynthesisConfig {
        flip_y: true,
        ..unit_config(20)
    };
    let toolpath = synthesize(&bitmap, &config).unwrap();
    assert_eq!(toolpath.commands[1], travel(4.0, 18.0));
    assert_eq!(toolpath.commands[3], draw(12.0, 18.0));
}

#[test]
fn repeated_runs_are_identical() {
    let bitmap = Bitmap::from_fn(48, 48, |x, y| (x * 7 + y * 13) % 5 == 0 || x == y);
    let config = unit_config(48);
    let a = synthesize(&bitmap, &config).unwrap();
    let b = synthesize(&bitmap, &config).unwrap();
    assert_eq!(a, b);
}

/// Longest pen-down move of a program made only of straight lines.
fn longest_draw(commands: &[MotionCommand]) -> f64 {
    let mut longest: f64 = 0.0;
    let mut pen_down = false;
    let mut at = (0.0, 0.0);
    for command in commands {
        match *command {
            MotionCommand::PenDown => pen_down = true,
            MotionCommand::PenUp => pen_down = false,
            MotionCommand::LinearMove { x, y, .. } => {
                if pen_down {
                    longest = longest.max((x - at.0).hypot(y - at.1));
                }
                at = (x, y);
            }
            _ => {}
        }
    }
    longest
}

#[test]
fn search_radius_is_measured_on_the_bed() {
    // 100 px over 115 mm: 1.15 mm/px, while pixels_per_mm claims ~23.6.
    // The dots are 50 px = 57.5 mm apart, far beyond the 5 mm radius.
    let bitmap = Bitmap::from_fn(100, 100, |x, y| y == 10 && (x == 10 || x == 60));
    let config = SynthesisConfig::default();
    let toolpath = synthesize(&bitmap, &config).unwrap();

    assert_eq!(toolpath.summary.island_count, 2);
    assert!(analyze(&toolpath.commands).draw_distance_mm.abs() < f64::EPSILON);
}

#[test]
fn fine_bed_scale_links_what_pixels_per_mm_would_not() {
    // 10 mm over 100 px: 0.1 mm/px. Dots 40 px apart are 4 mm apart on
    // the bed, inside the 5 mm radius, though 40 px at 1 px/mm is not.
    let bitmap = Bitmap::from_fn(100, 100, |x, y| y == 50 && (x == 10 || x == 50));
    let config = SynthesisConfig {
        pixels_per_mm: 1.0,
        canvas: Canvas {
            width_mm: 10.0,
            height_mm: 10.0,
        },
        ..SynthesisConfig::default()
    };
    let toolpath = synthesize(&bitmap, &config).unwrap();

    assert_eq!(toolpath.summary.island_count, 1);
    let longest = longest_draw(&toolpath.commands);
    assert!((longest - 4.0).abs() < 1e-9, "longest draw {longest}");
}
