//! Replay of detections recorded to a JSON file.
//!
//! The file maps 1-based frame numbers (as strings) to parallel arrays:
//!
//! ```json
//! {
//!   "1": {
//!     "bounding boxes": [[10, 20, 40, 80]],
//!     "detection scores": [0.92],
//!     "detected classes": ["person"]
//!   }
//! }
//! ```
//!
//! Boxes are TLWH in pixels.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::integration::{Detection, DetectionSource, IntoDetections};
use crate::tracker::Rect;

#[derive(Debug, Error)]
pub enum RecordedError {
    #[error("failed to read detections file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse detections file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no recorded detections for frame {0}")]
    MissingFrame(u32),
    #[error(
        "frame {frame} has {boxes} boxes, {scores} scores and {classes} classes; \
         the arrays must be the same length"
    )]
    LengthMismatch {
        frame: u32,
        boxes: usize,
        scores: usize,
        classes: usize,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct FrameRecord {
    #[serde(rename = "bounding boxes")]
    bounding_boxes: Vec<[f32; 4]>,
    #[serde(rename = "detection scores")]
    detection_scores: Vec<f32>,
    #[serde(rename = "detected classes")]
    detected_classes: Vec<String>,
}

/// Detection source that plays back a recorded detections file frame by frame.
#[derive(Debug, Clone)]
pub struct RecordedDetections {
    frames: BTreeMap<u32, FrameRecord>,
    next_frame: u32,
}

impl RecordedDetections {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RecordedError> {
        let frames: BTreeMap<u32, FrameRecord> = serde_json::from_reader(reader)?;
        debug!(frames = frames.len(), "loaded recorded detections");
        Ok(Self {
            frames,
            next_frame: 1,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, RecordedError> {
        Self::from_reader(json.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RecordedError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame number `detect` will return next.
    pub fn next_frame(&self) -> u32 {
        self.next_frame
    }

    pub fn seek(&mut self, frame: u32) {
        self.next_frame = frame;
    }

    /// Detections recorded for a 1-based frame number.
    pub fn frame(&self, frame: u32) -> Result<Vec<Detection>, RecordedError> {
        let record = self
            .frames
            .get(&frame)
            .ok_or(RecordedError::MissingFrame(frame))?;

        let boxes = record.bounding_boxes.len();
        let scores = record.detection_scores.len();
        let classes = record.detected_classes.len();
        if boxes != scores || boxes != classes {
            return Err(RecordedError::LengthMismatch {
                frame,
                boxes,
                scores,
                classes,
            });
        }

        let raw: Vec<(Rect, String, f32)> = record
            .bounding_boxes
            .iter()
            .zip(&record.detection_scores)
            .zip(&record.detected_classes)
            .map(|((&bbox, &score), label)| (Rect::from(bbox), label.clone(), score))
            .collect();
        Ok(raw.into_detections())
    }
}

impl DetectionSource for RecordedDetections {
    type Error = RecordedError;

    /// Ignores the pixels and returns the next recorded frame.
    fn detect(
        &mut self,
        _input: &[u8],
        _width: u32,
        _height: u32,
    ) -> Result<Vec<Detection>, Self::Error> {
        let detections = self.frame(self.next_frame)?;
        self.next_frame += 1;
        Ok(detections)
    }
}
