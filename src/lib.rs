//! Centroid tracking for detect-then-track video pipelines.
//!
//! Per-frame bounding boxes are matched against live tracks by centroid
//! distance using an optimal assignment, and each track keeps a persistent id
//! until it has been missed for more than `max_lost` consecutive frames.

pub mod integration;
pub mod tracker;

pub use integration::{
    Detection, DetectionBuilder, DetectionSource, FrameOutput, IntoDetections, PipelineError,
    RecordedDetections, RecordedError, TrackerPipeline,
};
pub use tracker::{
    AssignmentSolver, Association, CentroidTracker, CostMatrix, HungarianSolver, LapjvSolver,
    Point, Rect, Result, Track, TrackState, TrackTable, TrackerConfig, TrackerError,
};
