//! Detections and the trait for the backends that produce them.

use serde::{Deserialize, Serialize};

use crate::tracker::Rect;

/// Labeled detection produced by an object detector for one frame.
///
/// The tracker only consumes `bbox`; `label` and `score` are carried along
/// for filtering and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box in TLWH format
    pub bbox: Rect,
    /// Class label, e.g. `"person"`
    pub label: String,
    /// Detection confidence score
    pub score: f32,
}

impl Detection {
    pub fn new(bbox: Rect, label: impl Into<String>, score: f32) -> Self {
        Self {
            bbox,
            label: label.into(),
            score,
        }
    }
}

/// Trait for object detection backends.
///
/// Implement this trait to connect any detection model to the tracker.
///
/// # Example
///
/// ```ignore
/// use centroid_tracker::{DetectionSource, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
pub trait IntoDetections {
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

impl IntoDetections for Vec<(Rect, String, f32)> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter()
            .map(|(bbox, label, score)| Detection::new(bbox, label, score))
            .collect()
    }
}
