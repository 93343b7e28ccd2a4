//! Matting service request/response wire types.
//!
//! Field presence is enforced by the builders in [`crate::request`]:
//! automatic intents carry no hint fields at all, and hint fields that are
//! `None` are omitted from the serialized payload.

use serde::{Deserialize, Serialize};

/// Point prompts for a single frame of a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePoints {
    /// Frame index the prompts apply to
    pub frame: u32,
    /// Normalized (x, y) coordinates
    pub points: Vec<[f64; 2]>,
    /// Per-point labels: 1 = foreground, 0 = background
    pub labels: Vec<u8>,
}

/// Bounding box for a single frame of a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameBox {
    pub frame: u32,
    /// [x1, y1, x2, y2], normalized
    #[serde(rename = "box")]
    pub region: [f64; 4],
}

/// Request shape for video segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSegmentRequest {
    pub video_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_per_frame: Option<Vec<FramePoints>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_per_frame: Option<Vec<FrameBox>>,
}

/// Request shape for single-image segmentation (flat, non-per-frame).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSegmentRequest {
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<[f64; 2]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_labels: Option<Vec<u8>>,
    #[serde(rename = "box", skip_serializing_if = "Option::is_none")]
    pub region: Option<[f64; 4]>,
}

/// A media reference in a service response.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaRef {
    pub url: String,
}

/// Response from video segmentation.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoSegmentResponse {
    /// Mask video; absence is a hard failure
    pub video: Option<MediaRef>,
    pub track_id: Option<String>,
    /// Free-form progress notes emitted by the service, logged only
    #[serde(default)]
    pub progress: Vec<String>,
}

/// Response from image segmentation.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSegmentResponse {
    /// Mask image; absence is a hard failure
    pub image: Option<MediaRef>,
    #[serde(default)]
    pub progress: Vec<String>,
}
