//! TrackerPipeline for combining detection with tracking.

use thiserror::Error;
use tracing::trace;

use crate::integration::{Detection, DetectionSource, IntoDetections};
use crate::tracker::{
    AssignmentSolver, CentroidTracker, LapjvSolver, Rect, Track, TrackerConfig, TrackerError,
};

/// Failure of one pipeline step.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("detection failed: {0}")]
    Detection(#[source] E),
    #[error(transparent)]
    Tracking(#[from] TrackerError),
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub frame_id: u64,
    /// Every detection of the frame, before class filtering
    pub detections: Vec<Detection>,
    /// Live tracks in id order
    pub tracks: Vec<Track>,
}

/// A combined tracker that bundles a detection source with a `CentroidTracker`.
///
/// Only detections whose label passes the class filter are tracked; all of
/// them are still returned for drawing. Without a filter every detection is
/// tracked.
pub struct TrackerPipeline<D: DetectionSource, S = LapjvSolver> {
    detector: D,
    tracker: CentroidTracker<S>,
    classes: Option<Vec<String>>,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new tracking pipeline with the given detector and tracker config.
    pub fn new(detector: D, config: TrackerConfig) -> Self {
        Self::with_tracker(detector, CentroidTracker::new(config))
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, TrackerConfig::default())
    }
}

impl<D: DetectionSource, S: AssignmentSolver> TrackerPipeline<D, S> {
    pub fn with_tracker(detector: D, tracker: CentroidTracker<S>) -> Self {
        Self {
            detector,
            tracker,
            classes: None,
        }
    }

    /// Track only detections carrying one of these labels.
    pub fn with_class_filter<I, L>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.classes = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    pub fn tracks_class(&self, label: &str) -> bool {
        match &self.classes {
            Some(classes) => classes.iter().any(|c| c == label),
            None => true,
        }
    }

    /// Process a single frame: detect, filter by class, update the tracker.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<FrameOutput, PipelineError<D::Error>> {
        let detections = self
            .detector
            .detect(input, width, height)
            .map_err(PipelineError::Detection)?;
        Ok(self.process_detections(detections)?)
    }

    /// Filter already computed detections by class and update the tracker.
    ///
    /// The tracker is updated even when no detection passes the filter, so
    /// tracks keep aging through frames without their class.
    pub fn process_detections(
        &mut self,
        detections: impl IntoDetections,
    ) -> Result<FrameOutput, TrackerError> {
        let detections = detections.into_detections();
        let boxes: Vec<Rect> = detections
            .iter()
            .filter(|d| self.tracks_class(&d.label))
            .map(|d| d.bbox)
            .collect();
        trace!(detected = detections.len(), tracked = boxes.len(), "filtered detections");

        let tracks = self.tracker.update(&boxes)?.iter().cloned().collect();
        Ok(FrameOutput {
            frame_id: self.tracker.frame_id(),
            detections,
            tracks,
        })
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn tracker(&self) -> &CentroidTracker<S> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut CentroidTracker<S> {
        &mut self.tracker
    }
}
