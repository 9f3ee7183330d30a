use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::tracker::error::{Result, TrackerError};

/// A 2D point in pixel coordinates.
pub type Point = Point2<f32>;

/// Bounding box representation with format conversion utilities.
///
/// Stored as TLWH: Top-Left X, Top-Left Y, Width, Height. TLBR (two corners)
/// and center-XYWH inputs are converted on construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Create a Rect from its center point and dimensions.
    #[inline]
    pub fn from_xywh(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Get the center point of the bounding box, without validation.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// True when every coordinate is finite, both dimensions are positive and
    /// the center does not overflow.
    #[inline]
    pub fn is_valid(&self) -> bool {
        let center = self.center();
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
            && center.x.is_finite()
            && center.y.is_finite()
    }

    /// Centroid of a well-formed box.
    ///
    /// Boxes failing [`Rect::is_valid`] are rejected with
    /// [`TrackerError::InvalidBox`] instead of yielding a meaningless point.
    pub fn centroid(&self) -> Result<Point> {
        if !self.is_valid() {
            return Err(TrackerError::InvalidBox {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.center())
    }
}

impl From<[f32; 4]> for Rect {
    /// Interprets the array as TLWH.
    fn from(tlwh: [f32; 4]) -> Self {
        Rect::new(tlwh[0], tlwh[1], tlwh[2], tlwh[3])
    }
}
