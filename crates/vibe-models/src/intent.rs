//! Segmentation intent definitions.
//!
//! An intent tells the matting service which subject to isolate: nothing
//! (the service picks the primary subject), a set of point prompts, or a
//! bounding box. Exactly one variant is active; the serde tag doubles as
//! the `segmentation_method` field of the public export request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a point prompt marks foreground or background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PointLabel {
    Foreground,
    Background,
}

impl PointLabel {
    /// Wire label used by the segmentation service (SAM convention).
    pub fn as_wire(&self) -> u8 {
        match self {
            PointLabel::Foreground => 1,
            PointLabel::Background => 0,
        }
    }
}

/// A single point prompt, coordinates normalized to 0-1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PointPrompt {
    pub x: f64,
    pub y: f64,
    pub label: PointLabel,
}

impl PointPrompt {
    pub fn foreground(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            label: PointLabel::Foreground,
        }
    }

    pub fn background(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            label: PointLabel::Background,
        }
    }
}

/// Axis-aligned bounding box, coordinates normalized to 0-1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a validated bounding box.
    ///
    /// Requires `x1 < x2`, `y1 < y2` and all coordinates within [0, 1].
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, IntentError> {
        let bbox = Self { x1, y1, x2, y2 };
        bbox.validate()?;
        Ok(bbox)
    }

    fn validate(&self) -> Result<(), IntentError> {
        for value in [self.x1, self.y1, self.x2, self.y2] {
            if !(0.0..=1.0).contains(&value) {
                return Err(IntentError::CoordinateOutOfRange(value));
            }
        }
        if self.x1 >= self.x2 || self.y1 >= self.y2 {
            return Err(IntentError::DegenerateBox {
                x1: self.x1,
                y1: self.y1,
                x2: self.x2,
                y2: self.y2,
            });
        }
        Ok(())
    }
}

/// How the segmentation service should pick the subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "segmentation_method", rename_all = "snake_case")]
pub enum SegmentationIntent {
    /// No hints; the service infers the primary subject.
    Automatic,
    /// One or more point prompts.
    Points { points: Vec<PointPrompt> },
    /// A single bounding box.
    Box {
        #[serde(rename = "box")]
        region: BoundingBox,
    },
}

impl SegmentationIntent {
    /// Create a validated point-prompt intent. Fails on an empty list or
    /// out-of-range coordinates.
    pub fn points(points: Vec<PointPrompt>) -> Result<Self, IntentError> {
        let intent = Self::Points { points };
        intent.validate()?;
        Ok(intent)
    }

    /// Create a bounding-box intent.
    pub fn bounding_box(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, IntentError> {
        Ok(Self::Box {
            region: BoundingBox::new(x1, y1, x2, y2)?,
        })
    }

    /// Re-validate an intent that arrived via deserialization.
    pub fn validate(&self) -> Result<(), IntentError> {
        match self {
            SegmentationIntent::Automatic => Ok(()),
            SegmentationIntent::Points { points } => {
                if points.is_empty() {
                    return Err(IntentError::EmptyPoints);
                }
                for p in points {
                    if !(0.0..=1.0).contains(&p.x) {
                        return Err(IntentError::CoordinateOutOfRange(p.x));
                    }
                    if !(0.0..=1.0).contains(&p.y) {
                        return Err(IntentError::CoordinateOutOfRange(p.y));
                    }
                }
                Ok(())
            }
            SegmentationIntent::Box { region } => region.validate(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IntentError {
    #[error("point prompt list is empty")]
    EmptyPoints,

    #[error("coordinate {0} outside normalized range [0, 1]")]
    CoordinateOutOfRange(f64),

    #[error("degenerate bounding box ({x1}, {y1}, {x2}, {y2}): requires x1 < x2 and y1 < y2")]
    DegenerateBox { x1: f64, y1: f64, x2: f64, y2: f64 },
}
