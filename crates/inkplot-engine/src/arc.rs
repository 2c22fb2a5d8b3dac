//! Circular arc fitting for simplified path segments.
//!
//! A segment is the raw run of island points between two consecutive RDP
//! anchors. When those points lie close enough to a circle they are drawn
//! as one `G2`/`G3` move instead of a straight line.
//!
//! The circle is the algebraic least-squares fit (Kasa): coordinates are
//! centered on their mean and the center solves a 2x2 system built from
//! second and third moments. Exactly collinear points make the system
//! singular and produce no fit.

use crate::types::{ArcDirection, Point};

/// Relative determinant magnitude below which the moment system is
/// treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A successful arc fit for one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcFit {
    /// Segment start point.
    pub start: Point,
    /// Segment end point (the arc move's target).
    pub end: Point,
    /// Absolute center of the fitted circle.
    pub center: Point,
    /// Center X offset relative to `start`.
    pub i: f64,
    /// Center Y offset relative to `start`.
    pub j: f64,
    /// Fitted radius.
    pub radius: f64,
    /// Rotational sense.
    pub direction: ArcDirection,
    /// Largest `|distance to center - radius|` over the segment's points.
    pub max_residual: f64,
}

/// A fitted circle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Circle {
    center: Point,
    radius: f64,
}

/// Fit a circular arc through `points`.
///
/// Returns `None` when there are fewer than 3 points, when the points are
/// collinear, or when any point lies more than `tolerance` from the fitted
/// circle. Callers fall back to a straight line in every one of those
/// cases.
///
/// The direction comes from the sign of the cross product of
/// `middle - first` and `last - first`, where `middle` is the point at
/// index `len / 2`: positive is counter-clockwise, zero or negative is
/// clockwise. A single sample can misjudge S-shaped runs; the rule is kept
/// exactly because emitted programs depend on it.
#[must_use]
pub fn fit_arc(points: &[Point], tolerance: f64) -> Option<ArcFit> {
    if points.len() < 3 {
        return None;
    }

    let circle = fit_circle(points)?;

    let max_residual = points
        .iter()
        .map(|p| (p.distance(circle.center) - circle.radius).abs())
        .fold(0.0, f64::max);
    if max_residual > tolerance {
        return None;
    }

    let start = *points.first()?;
    let end = *points.last()?;
    let middle = points[points.len() / 2];

    Some(ArcFit {
        start,
        end,
        center: circle.center,
        i: circle.center.x - start.x,
        j: circle.center.y - start.y,
        radius: circle.radius,
        direction: direction_of(start, middle, end),
        max_residual,
    })
}

/// Rotational sense of the run `first -> middle -> last`.
fn direction_of(first: Point, middle: Point, last: Point) -> ArcDirection {
    let (ax, ay) = (middle.x - first.x, middle.y - first.y);
    let (bx, by) = (last.x - first.x, last.y - first.y);
    let cross = ax.mul_add(by, -(ay * bx));
    if cross > 0.0 {
        ArcDirection::CounterClockwise
    } else {
        ArcDirection::Clockwise
    }
}

/// Algebraic least-squares circle through `points`.
#[allow(clippy::cast_precision_loss, clippy::similar_names)]
fn fit_circle(points: &[Point]) -> Option<Circle> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

    let (mut suu, mut svv, mut suv) = (0.0, 0.0, 0.0);
    let (mut suuu, mut svvv, mut suvv, mut svuu) = (0.0, 0.0, 0.0, 0.0);
    for p in points {
        let u = p.x - mean_x;
        let v = p.y - mean_y;
        let uu = u * u;
        let vv = v * v;
        suu += uu;
        svv += vv;
        suv += u * v;
        suuu += uu * u;
        svvv += vv * v;
        suvv += u * vv;
        svuu += v * uu;
    }

    // suu * uc + suv * vc = (suuu + suvv) / 2
    // suv * uc + svv * vc = (svvv + svuu) / 2
    let det = suu.mul_add(svv, -(suv * suv));
    if det.abs() <= SINGULAR_EPSILON * suu * svv {
        return None;
    }

    let b1 = (suuu + suvv) / 2.0;
    let b2 = (svvv + svuu) / 2.0;
    let uc = b1.mul_add(svv, -(b2 * suv)) / det;
    let vc = suu.mul_add(b2, -(suv * b1)) / det;

    let radius = (uc.mul_add(uc, vc * vc) + (suu + svv) / n).sqrt();
    let center = Point::new(mean_x + uc, mean_y + vc);
    if !radius.is_finite() || !center.x.is_finite() || !center.y.is_finite() {
        return None;
    }

    Some(Circle { center, radius })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    /// `count` points evenly spaced on a full turn, starting at angle 0.
    fn circle_points(cx: f64, cy: f64, r: f64, count: u32) -> Vec<Point> {
        (0..count)
            .map(|k| {
                let a = 2.0 * PI * f64::from(k) / f64::from(count);
                Point::new(r.mul_add(a.cos(), cx), r.mul_add(a.sin(), cy))
            })
            .collect()
    }

    /// Push every point radially in or out by `delta`, alternating.
    fn perturb(points: &[Point], cx: f64, cy: f64, delta: f64) -> Vec<Point> {
        points
            .iter()
            .enumerate()
            .map(|(k, p)| {
                let (dx, dy) = (p.x - cx, p.y - cy);
                let len = dx.hypot(dy);
                let s = if k % 2 == 0 { delta } else { -delta };
                Point::new(p.x + dx / len * s, p.y + dy / len * s)
            })
            .collect()
    }

    #[test]
    fn fewer_than_three_points_is_no_fit() {
        assert!(fit_arc(&[], 1.0).is_none());
        assert!(fit_arc(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)], 1.0).is_none());
    }

    #[test]
    fn collinear_points_are_singular() {
        let diagonal: Vec<Point> = (0..11)
            .map(|i| Point::new(f64::from(i), f64::from(i)))
            .collect();
        assert!(fit_arc(&diagonal, 1.0).is_none());

        let horizontal: Vec<Point> = (0..5).map(|i| Point::new(f64::from(i), 3.0)).collect();
        assert!(fit_arc(&horizontal, 1.0).is_none());
    }

    #[test]
    fn identical_points_are_singular() {
        let points = vec![Point::new(2.0, 2.0); 4];
        assert!(fit_arc(&points, 1.0).is_none());
    }

    #[test]
    fn sixteen_points_on_a_circle() {
        let points = circle_points(20.0, 20.0, 5.0, 16);
        let fit = fit_arc(&points, 1.0).unwrap();
        assert!((fit.radius - 5.0).abs() < 1e-9, "radius {}", fit.radius);
        assert!((fit.center.x - 20.0).abs() < 1e-9);
        assert!((fit.center.y - 20.0).abs() < 1e-9);
        assert!((fit.i.hypot(fit.j) - 5.0).abs() < 1e-9);
        assert_eq!(fit.end, points[15]);
        assert_eq!(fit.start, points[0]);
    }

    #[test]
    fn offsets_are_relative_to_start() {
        let points = circle_points(20.0, 20.0, 5.0, 16);
        let fit = fit_arc(&points, 1.0).unwrap();
        // Start is (25, 20); the center lies 5 to its left.
        assert!((fit.i + 5.0).abs() < 1e-9);
        assert!(fit.j.abs() < 1e-9);
    }

    #[test]
    fn rounded_circle_fits_within_tolerance() {
        let points: Vec<Point> = circle_points(20.0, 20.0, 5.0, 16)
            .into_iter()
            .map(|p| Point::new(p.x.round(), p.y.round()))
            .collect();
        let fit = fit_arc(&points, 1.0).unwrap();
        assert!((fit.radius - 5.0).abs() <= 1.0);
        assert!(fit.max_residual <= 1.0);
    }

    #[test]
    fn perturbation_within_tolerance_is_accepted() {
        let clean = circle_points(50.0, 40.0, 12.0, 24);
        let noisy = perturb(&clean, 50.0, 40.0, 0.3);
        let fit = fit_arc(&noisy, 1.0).unwrap();
        assert!((fit.radius - 12.0).abs() <= 1.0, "radius {}", fit.radius);
    }

    #[test]
    fn perturbation_beyond_tolerance_is_rejected() {
        let clean = circle_points(50.0, 40.0, 12.0, 24);
        let noisy = perturb(&clean, 50.0, 40.0, 2.0);
        assert!(fit_arc(&noisy, 1.0).is_none());
    }

    #[test]
    fn quarter_arc_direction_follows_cross_product() {
        // Angles 0..90 degrees in y-up math terms: counter-clockwise.
        let ccw: Vec<Point> = (0..=6)
            .map(|k| {
                let a = PI / 2.0 * f64::from(k) / 6.0;
                Point::new(10.0 * a.cos(), 10.0 * a.sin())
            })
            .collect();
        let fit = fit_arc(&ccw, 0.5).unwrap();
        assert_eq!(fit.direction, ArcDirection::CounterClockwise);

        let mut cw = ccw;
        cw.reverse();
        let fit = fit_arc(&cw, 0.5).unwrap();
        assert_eq!(fit.direction, ArcDirection::Clockwise);
    }

    #[test]
    fn zero_cross_product_is_clockwise() {
        let d = direction_of(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        );
        assert_eq!(d, ArcDirection::Clockwise);
    }
}
