//! Error types for the tracking core.

use thiserror::Error;

/// Contract violations reported by the tracker and the assignment solvers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// A bounding box with non-positive or non-finite geometry.
    #[error(
        "invalid bounding box (x={x}, y={y}, width={width}, height={height}): \
         coordinates must be finite and width/height strictly positive"
    )]
    InvalidBox {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// The solver was given a matrix with no rows or no columns.
    #[error("cost matrix is empty ({rows}x{cols})")]
    EmptyCostMatrix { rows: usize, cols: usize },
    /// The solver was given a NaN or infinite cost.
    #[error("cost matrix has a non-finite entry at ({row}, {col})")]
    NonFiniteCost { row: usize, col: usize },
    /// The backing assignment library failed.
    #[error("assignment solver failed: {0}")]
    Solver(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
