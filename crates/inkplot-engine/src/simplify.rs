//! Path simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! Reduces an island's raw point run to the anchor points that carry its
//! shape. Anchors are always a subsequence of the input (never
//! interpolated) and always include the first and last point.
//!
//! The split recursion runs on an explicit stack of index ranges so long,
//! noisy islands cannot exhaust the call stack.

use crate::types::{Point, Polyline};

/// Indices of the points RDP keeps, in ascending order.
///
/// Inputs with fewer than 3 points keep every index. Ties for the farthest
/// point are resolved in favour of the lowest index.
#[must_use = "returns the retained anchor indices"]
pub fn simplify_indices(points: &[Point], epsilon: f64) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        return (0..n).collect();
    }

    let mut kept = vec![false; n];
    kept[0] = true;
    kept[n - 1] = true;

    let mut ranges = vec![(0, n - 1)];
    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = start;
        for i in (start + 1)..end {
            let d = segment_distance(points[i], points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        // max_idx == start means every interior point lies on the chord.
        if max_dist > epsilon && max_idx > start {
            kept[max_idx] = true;
            // Suffix pushed first so the prefix is processed first.
            ranges.push((max_idx, end));
            ranges.push((start, max_idx));
        }
    }

    kept.iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect()
}

/// Simplify a single polyline.
///
/// Points within `epsilon` of the segment between their retained
/// neighbours are removed. An epsilon of 0.0 removes only points lying
/// exactly on that segment.
#[must_use = "returns the simplified polyline"]
pub fn simplify(polyline: &Polyline, epsilon: f64) -> Polyline {
    let points = polyline.points();
    Polyline::new(
        simplify_indices(points, epsilon)
            .into_iter()
            .map(|i| points[i])
            .collect(),
    )
}

/// Distance from `p` to the segment `a`-`b`.
///
/// Points whose projection falls inside the segment get the perpendicular
/// distance; others the distance to the nearer endpoint. When `a` and `b`
/// coincide this is the distance from `p` to `a`.
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let t = ((p.x - a.x).mul_add(dx, (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    let projection = Point::new(t.mul_add(dx, a.x), t.mul_add(dy, a.y));
    p.distance(projection)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pl(points: &[(f64, f64)]) -> Polyline {
        Polyline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn short_inputs_unchanged() {
        assert!(simplify(&pl(&[]), 1.0).is_empty());
        assert_eq!(simplify(&pl(&[(1.0, 2.0)]), 1.0).len(), 1);
        assert_eq!(simplify(&pl(&[(0.0, 0.0), (10.0, 0.0)]), 1.0).len(), 2);
        assert_eq!(simplify_indices(&[], 1.0), Vec::<usize>::new());
    }

    #[test]
    fn collinear_points_collapse_to_endpoints() {
        let points: Vec<(f64, f64)> = (0..11).map(|i| (f64::from(i), f64::from(i))).collect();
        let result = simplify(&pl(&points), 2.0);
        assert_eq!(result.points(), pl(&[(0.0, 0.0), (10.0, 10.0)]).points());
    }

    #[test]
    fn zigzag_retains_peaks() {
        let zigzag = pl(&[(0.0, 0.0), (2.0, 5.0), (4.0, 0.0), (6.0, 5.0), (8.0, 0.0)]);
        assert_eq!(simplify(&zigzag, 1.0).len(), 5);
        assert_eq!(simplify(&zigzag, 10.0).len(), 2);
    }

    #[test]
    fn indices_mark_the_corner() {
        // An L shape: the corner at index 3 must survive.
        let points = pl(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (3.0, 1.0),
            (3.0, 2.0),
            (3.0, 3.0),
        ]);
        assert_eq!(simplify_indices(points.points(), 0.5), vec![0, 3, 6]);
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        // Indices 1 and 3 are both 2.0 from the baseline.
        let points = pl(&[(0.0, 0.0), (1.0, 2.0), (2.0, 0.0), (3.0, 2.0), (4.0, 0.0)]);
        let kept = simplify_indices(points.points(), 1.9);
        assert_eq!(kept[1], 1);
    }

    #[test]
    fn coincident_endpoints_use_point_distance() {
        // A closed loop: first == last, so distances are radial.
        let points = pl(&[(0.0, 0.0), (3.0, 4.0), (1.0, 1.0), (0.0, 0.0)]);
        let kept = simplify_indices(points.points(), 4.0);
        assert_eq!(kept, vec![0, 1, 3]);
    }

    #[test]
    fn long_input_does_not_recurse_deeply() {
        // A staircase whose steps all exceed the tolerance.
        let points: Vec<Point> = (0..5_000_u32)
            .map(|i| Point::new(f64::from(i / 2 + i % 2), f64::from(i / 2)))
            .collect();
        let kept = simplify_indices(&points, 0.1);
        assert_eq!(kept.first(), Some(&0));
        assert_eq!(kept.last(), Some(&(points.len() - 1)));
    }

    #[test]
    fn negative_epsilon_terminates() {
        let points: Vec<Point> = (0..5).map(|i| Point::new(f64::from(i), 0.0)).collect();
        assert_eq!(simplify_indices(&points, -1.0), vec![0, 4]);
    }

    #[test]
    fn negative_epsilon_stops_on_collinear_runs() {
        let points = pl(&[(0.0, 0.0), (1.0, 0.5), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);
        assert_eq!(simplify_indices(points.points(), -1.0), vec![0, 1, 2, 4]);
    }

    #[test]
    fn segment_distance_on_axis() {
        let d = segment_distance(
            Point::new(1.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-10);
    }

    #[test]
    fn segment_distance_beyond_endpoint() {
        // Projection falls past b = (2,0); distance is to b.
        let d = segment_distance(
            Point::new(5.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-10);
    }

    #[test]
    fn segment_distance_coincident_endpoints() {
        let d = segment_distance(
            Point::new(3.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-10);
    }
}
