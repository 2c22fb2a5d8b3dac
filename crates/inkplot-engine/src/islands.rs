//! Island traversal: partition ink points into pen strokes.
//!
//! Uses a greedy nearest-neighbour walk. Seeds are taken in point-set
//! order (raster scan: top-to-bottom, left-to-right). From the seed, each
//! step moves to the nearest unvisited point among the `k` nearest
//! neighbours within the search radius. When none qualifies the island is
//! closed and the next unvisited point seeds a new one.
//!
//! This is a local heuristic, not a tour solver: a far point is never
//! linked even when it is the closest remaining one, and a dense cluster
//! whose `k` nearest are all visited ends the island early.

use crate::observer::SynthesisObserver;
use crate::raster::PointSet;
use crate::spatial::SpatialIndex;
use crate::types::{PixelPoint, Point, Polyline};

/// One connected-by-proximity run of ink points, in drawing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Island(Vec<PixelPoint>);

impl Island {
    /// Create an island from points already in drawing order.
    #[must_use]
    pub const fn new(points: Vec<PixelPoint>) -> Self {
        Self(points)
    }

    /// Points in drawing order.
    #[must_use]
    pub fn points(&self) -> &[PixelPoint] {
        &self.0
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the island has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Minimum `(y, x)` over the island's bounding box, used as a
    /// top-to-bottom, left-to-right sort key.
    #[must_use]
    pub fn bounding_min(&self) -> Option<(u32, u32)> {
        let min_x = self.0.iter().map(|p| p.x).min()?;
        let min_y = self.0.iter().map(|p| p.y).min()?;
        Some((min_y, min_x))
    }

    /// The island as continuous-coordinate geometry.
    #[must_use]
    pub fn to_polyline(&self) -> Polyline {
        Polyline::new(self.0.iter().map(|&p| Point::from(p)).collect())
    }
}

/// Parameters of the nearest-neighbour walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraversalParams {
    /// Neighbours considered per step.
    pub neighbour_count: usize,
    /// Hard linking cutoff in pixels.
    pub search_radius_px: f64,
    /// Observer progress interval in points (0 disables).
    pub progress_interval: usize,
}

/// Per-run traversal state. Created and dropped inside [`trace_islands`].
struct Traversal<'a> {
    points: &'a PointSet,
    index: &'a SpatialIndex,
    params: TraversalParams,
    visited: Vec<bool>,
    visited_count: usize,
    /// Everything before this index is known to be visited.
    cursor: usize,
}

impl<'a> Traversal<'a> {
    fn new(points: &'a PointSet, index: &'a SpatialIndex, params: TraversalParams) -> Self {
        Self {
            points,
            index,
            params,
            visited: vec![false; points.len()],
            visited_count: 0,
            cursor: 0,
        }
    }

    fn next_seed(&mut self) -> Option<usize> {
        while self.cursor < self.visited.len() {
            if !self.visited[self.cursor] {
                return Some(self.cursor);
            }
            self.cursor += 1;
        }
        None
    }

    fn visit(&mut self, i: usize, observer: &mut dyn SynthesisObserver) {
        self.visited[i] = true;
        self.visited_count += 1;
        let interval = self.params.progress_interval;
        if interval > 0 && self.visited_count % interval == 0 {
            observer.points_processed(self.visited_count, self.points.len());
        }
    }

    fn nearest_unvisited(&self, current: PixelPoint) -> Option<usize> {
        self.index
            .query_k_nearest(
                current,
                self.params.neighbour_count,
                self.params.search_radius_px,
            )
            .into_iter()
            .find(|&i| !self.visited[i])
    }

    fn walk_from(&mut self, seed: usize, observer: &mut dyn SynthesisObserver) -> Island {
        let mut island = Vec::new();
        let mut current = seed;
        loop {
            self.visit(current, observer);
            let Some(point) = self.points.get(current) else {
                break;
            };
            island.push(point);
            match self.nearest_unvisited(point) {
                Some(next) => current = next,
                None => break,
            }
        }
        Island::new(island)
    }
}

/// Partition `points` into islands.
///
/// `index` must have been built from the same `points`. Every point
/// appears in exactly one island; an empty set yields no islands.
#[must_use]
pub fn trace_islands(
    points: &PointSet,
    index: &SpatialIndex,
    params: TraversalParams,
    observer: &mut dyn SynthesisObserver,
) -> Vec<Island> {
    let mut traversal = Traversal::new(points, index, params);
    let mut islands = Vec::new();

    while let Some(seed) = traversal.next_seed() {
        let island = traversal.walk_from(seed, observer);
        observer.island_completed(islands.len(), island.len());
        islands.push(island);
    }

    islands
}
