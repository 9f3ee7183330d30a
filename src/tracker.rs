mod centroid_tracker;
mod error;
mod hungarian;
pub mod matching;
mod rect;
mod track;
mod track_state;

pub use centroid_tracker::{Association, CentroidTracker, TrackerConfig};
pub use error::{Result, TrackerError};
pub use hungarian::HungarianSolver;
pub use matching::{AssignmentSolver, CostMatrix, LapjvSolver};
pub use rect::{Point, Rect};
pub use track::{Track, TrackTable};
pub use track_state::TrackState;
