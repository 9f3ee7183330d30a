//! Native Kuhn-Munkres (Hungarian) assignment.
//!
//! Shortest augmenting paths with row/column potentials, O(n^2 * m) for an
//! n x m matrix with n <= m. Taller matrices are solved transposed.

use ndarray::Array2;

use crate::tracker::error::Result;
use crate::tracker::matching::{AssignmentSolver, check_costs};

/// Pure-Rust Hungarian solver, interchangeable with [`LapjvSolver`](crate::LapjvSolver).
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl AssignmentSolver for HungarianSolver {
    fn solve(&self, costs: &Array2<f32>) -> Result<Vec<(usize, usize)>> {
        check_costs(costs)?;
        let (rows, cols) = costs.dim();

        let mut pairs = if rows <= cols {
            munkres(rows, cols, |i, j| costs[[i, j]] as f64)
        } else {
            munkres(cols, rows, |i, j| costs[[j, i]] as f64)
                .into_iter()
                .map(|(c, r)| (r, c))
                .collect()
        };
        pairs.sort_unstable();
        Ok(pairs)
    }
}

/// Assign each of `n` rows to a distinct one of `m >= n` columns.
fn munkres(n: usize, m: usize, cost: impl Fn(usize, usize) -> f64) -> Vec<(usize, usize)> {
    // 1-based with index 0 as the virtual source column.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    // owner[j] = row (1-based) currently assigned to column j, 0 if free
    let mut owner = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        owner[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path back to the source.
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    (1..=m)
        .filter(|&j| owner[j] != 0)
        .map(|j| (owner[j] - 1, j - 1))
        .collect()
}
