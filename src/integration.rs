//! Integration module for connecting detection sources with the centroid tracker.
//!
//! This module provides traits and utilities for feeding detections from any
//! backend (a live model, a recorded detections file) into the tracker, and
//! for handing the results to a renderer.

mod builder;
mod detector;
mod pipeline;
mod recorded;

pub use builder::DetectionBuilder;
pub use detector::{Detection, DetectionSource, IntoDetections};
pub use pipeline::{FrameOutput, PipelineError, TrackerPipeline};
pub use recorded::{RecordedDetections, RecordedError};
