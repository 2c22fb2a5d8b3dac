//! Spatial index over a [`PointSet`] for bounded k-nearest-neighbour queries.
//!
//! Backed by an R\*-tree (`rstar`), bulk-loaded once per synthesis run.
//! Query results are fully deterministic: equal distances are ordered by
//! the point's index in the set, which is raster-scan order.

use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::raster::PointSet;
use crate::types::PixelPoint;

/// A pixel coordinate tagged with its index in the point set.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

fn to_coords(p: PixelPoint) -> [f64; 2] {
    [f64::from(p.x), f64::from(p.y)]
}

/// Nearest-neighbour index over the points of one [`PointSet`].
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    /// Bulk-load an index over every point in `points`.
    #[must_use]
    pub fn build(points: &PointSet) -> Self {
        let entries: Vec<IndexedPoint> = points
            .points()
            .iter()
            .enumerate()
            .map(|(i, &p)| GeomWithData::new(to_coords(p), i))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if the index holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Indices of up to `k` points nearest to `point`, nearest first.
    ///
    /// Points farther than `max_distance` (Euclidean, in pixels) are never
    /// returned. Ties on distance are broken by ascending point index, so
    /// the result does not depend on the tree's internal layout. The query
    /// point itself is included when it is part of the set.
    #[must_use]
    pub fn query_k_nearest(&self, point: PixelPoint, k: usize, max_distance: f64) -> Vec<usize> {
        if k == 0 {
            return Vec::new();
        }

        let max_distance_2 = max_distance * max_distance;
        let mut hits: Vec<(f64, usize)> = Vec::with_capacity(k);

        for (entry, distance_2) in self
            .tree
            .nearest_neighbor_iter_with_distance_2(&to_coords(point))
        {
            if distance_2 > max_distance_2 {
                break;
            }
            // Once k hits are collected, keep pulling only candidates tied
            // with the farthest hit so the index tie-break sees all of them.
            if hits.len() >= k && hits.last().is_some_and(|&(last, _)| distance_2 > last) {
                break;
            }
            hits.push((distance_2, entry.data));
        }

        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.truncate(k);
        hits.into_iter().map(|(_, index)| index).collect()
    }
}
