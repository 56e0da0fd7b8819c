//! Uniform-grid spatial hash over node positions.
//!
//! Bounds the simulator's repulsion step: instead of scanning all pairs, each
//! node queries the cells covering its repulsion radius. The grid is rebuilt
//! from scratch every frame; per-frame movement is capped by the annealing
//! temperature, so incremental maintenance buys nothing.

use rustc_hash::FxHashMap;
use siren_graph::Point;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: FxHashMap<(i64, i64), Vec<usize>>,
    points: Vec<Point>,
}

impl SpatialGrid {
    /// Build the grid in O(N). `cell_size` defaults to the simulator's
    /// repulsion radius; values <= 0 are remapped to 1.
    pub fn build(points: &[Point], cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        let mut cells: FxHashMap<(i64, i64), Vec<usize>> = FxHashMap::default();
        for (idx, p) in points.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite()) {
                continue;
            }
            cells
                .entry(Self::cell_key(p.x, p.y, cell_size))
                .or_default()
                .push(idx);
        }
        Self {
            cell_size,
            cells,
            points: points.to_vec(),
        }
    }

    fn cell_key(x: f64, y: f64, cell_size: f64) -> (i64, i64) {
        ((x / cell_size).floor() as i64, (y / cell_size).floor() as i64)
    }

    /// Point indices whose cell lies within `radius` of `(x, y)`.
    ///
    /// This is a cheap over-approximation: everything inside the radius is
    /// returned, plus corner occupants of the scanned cells. Callers re-check
    /// exact distance.
    pub fn query_radius(&self, x: f64, y: f64, radius: f64) -> Vec<usize> {
        if self.cells.is_empty() || !(radius.is_finite() && radius >= 0.0) {
            return Vec::new();
        }
        let reach = (radius / self.cell_size).ceil() as i64;
        let (cx, cy) = Self::cell_key(x, y, self.cell_size);
        let mut out: Vec<usize> = Vec::new();
        for gx in (cx - reach)..=(cx + reach) {
            for gy in (cy - reach)..=(cy + reach) {
                if let Some(bucket) = self.cells.get(&(gx, gy)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        out
    }

    /// Exact-distance variant of [`Self::query_radius`].
    pub fn query_radius_exact(&self, x: f64, y: f64, radius: f64) -> Vec<usize> {
        let probe = Point::new(x, y);
        let mut out = self.query_radius(x, y, radius);
        out.retain(|&idx| self.points[idx].distance_to(&probe) <= radius);
        out
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_covers_exact_radius_matches() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(0.0, 45.0),
            Point::new(500.0, 500.0),
        ];
        let grid = SpatialGrid::build(&points, 50.0);
        let hits = grid.query_radius(0.0, 0.0, 50.0);
        assert!(hits.contains(&0));
        assert!(hits.contains(&1));
        assert!(hits.contains(&2));
        assert!(!hits.contains(&3));
    }

    #[test]
    fn exact_query_filters_corner_occupants() {
        let points = vec![Point::new(0.0, 0.0), Point::new(49.0, 49.0)];
        let grid = SpatialGrid::build(&points, 50.0);
        // The superset query sees both; the exact query drops the corner.
        assert_eq!(grid.query_radius(0.0, 0.0, 50.0).len(), 2);
        assert_eq!(grid.query_radius_exact(0.0, 0.0, 50.0), vec![0]);
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let points = vec![Point::new(f64::NAN, 0.0), Point::new(1.0, 1.0)];
        let grid = SpatialGrid::build(&points, 10.0);
        assert_eq!(grid.query_radius(0.0, 0.0, 10.0), vec![1]);
    }

    #[test]
    fn degenerate_cell_size_is_remapped() {
        let points = vec![Point::new(3.0, 4.0)];
        let grid = SpatialGrid::build(&points, 0.0);
        assert_eq!(grid.query_radius(3.0, 4.0, 1.0), vec![0]);
    }
}
