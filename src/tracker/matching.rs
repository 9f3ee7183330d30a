//! Matching utilities: centroid cost matrices and optimal assignment.

use ndarray::Array2;

use crate::tracker::error::{Result, TrackerError};
use crate::tracker::rect::Point;

/// Pairwise centroid distances between tracks (rows) and detections (columns).
///
/// Each cell also remembers which track id and detection index it was built
/// from, so solver output in matrix coordinates can be mapped back without
/// the solver knowing about ids.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    costs: Array2<f32>,
    pairs: Array2<(u64, usize)>,
}

impl CostMatrix {
    /// The raw distances, shaped (tracks, detections).
    pub fn costs(&self) -> &Array2<f32> {
        &self.costs
    }

    pub fn dim(&self) -> (usize, usize) {
        self.costs.dim()
    }

    pub fn cost(&self, row: usize, col: usize) -> f32 {
        self.costs[[row, col]]
    }

    /// Track id and detection index behind a matrix cell.
    pub fn resolve(&self, row: usize, col: usize) -> (u64, usize) {
        self.pairs[[row, col]]
    }
}

/// Euclidean distance between two centroids.
///
/// Computed in `f64` and clamped to `f32::MAX`, so any two finite points give
/// a finite cost.
pub fn centroid_gap(a: &Point, b: &Point) -> f32 {
    let d = nalgebra::distance(&a.cast::<f64>(), &b.cast::<f64>());
    d.min(f32::MAX as f64) as f32
}

/// Compute the Euclidean distance matrix between track centroids and detection centroids.
pub fn centroid_distance(tracks: &[(u64, Point)], detections: &[Point]) -> CostMatrix {
    let shape = (tracks.len(), detections.len());
    let costs = Array2::from_shape_fn(shape, |(i, j)| centroid_gap(&tracks[i].1, &detections[j]));
    let pairs = Array2::from_shape_fn(shape, |(i, j)| (tracks[i].0, j));
    CostMatrix { costs, pairs }
}

/// Minimum-cost one-to-one assignment between rows and columns.
///
/// Implementations return exactly `min(rows, cols)` `(row, col)` pairs,
/// sorted by row, and must be deterministic for a given matrix. An empty or
/// non-finite matrix is an error rather than an empty assignment.
pub trait AssignmentSolver {
    fn solve(&self, costs: &Array2<f32>) -> Result<Vec<(usize, usize)>>;
}

impl<S: AssignmentSolver + ?Sized> AssignmentSolver for &S {
    fn solve(&self, costs: &Array2<f32>) -> Result<Vec<(usize, usize)>> {
        (**self).solve(costs)
    }
}

/// Reject matrices no solver can give a meaningful answer for.
pub(crate) fn check_costs(costs: &Array2<f32>) -> Result<()> {
    let (rows, cols) = costs.dim();
    if rows == 0 || cols == 0 {
        return Err(TrackerError::EmptyCostMatrix { rows, cols });
    }
    if let Some(((row, col), _)) = costs.indexed_iter().find(|(_, c)| !c.is_finite()) {
        return Err(TrackerError::NonFiniteCost { row, col });
    }
    Ok(())
}

/// Jonker-Volgenant solver backed by the `lapjv` crate.
///
/// The matrix is padded to square with a constant larger than every real
/// cost; constant padding does not change which real pairs are optimal.
#[derive(Debug, Clone, Copy, Default)]
pub struct LapjvSolver;

impl AssignmentSolver for LapjvSolver {
    fn solve(&self, costs: &Array2<f32>) -> Result<Vec<(usize, usize)>> {
        check_costs(costs)?;
        let (num_rows, num_cols) = costs.dim();

        let size = num_rows.max(num_cols);
        let pad = costs.iter().fold(0.0f64, |acc, &c| acc.max(c as f64)) + 1.0;
        let mut padded = Array2::<f64>::from_elem((size, size), pad);
        for ((i, j), &c) in costs.indexed_iter() {
            padded[[i, j]] = c as f64;
        }

        let (row_to_col, _) =
            lapjv::lapjv(&padded).map_err(|e| TrackerError::Solver(format!("{e:?}")))?;

        Ok(row_to_col
            .into_iter()
            .enumerate()
            .filter(|&(row, col)| row < num_rows && col < num_cols)
            .collect())
    }
}
