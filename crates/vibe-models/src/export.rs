//! Export request/response models and segmentation results.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::OutputFormat;
use crate::intent::SegmentationIntent;

/// Target output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Create a resolution. Dimensions must be non-zero and even: the
    /// alpha-carrying pixel formats used by the encoder reject odd sizes.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<(), ResolutionParseError> {
        if self.width == 0 || self.height == 0 {
            return Err(ResolutionParseError::ZeroValue);
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(ResolutionParseError::OddDimension(self.width, self.height));
        }
        Ok(())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            return Err(ResolutionParseError::InvalidFormat(s.to_string()));
        }

        let width = parts[0]
            .parse()
            .map_err(|_| ResolutionParseError::InvalidNumber(parts[0].to_string()))?;
        let height = parts[1]
            .parse()
            .map_err(|_| ResolutionParseError::InvalidNumber(parts[1].to_string()))?;

        let resolution = Resolution { width, height };
        resolution.validate()?;
        Ok(resolution)
    }
}

#[derive(Debug, Error)]
pub enum ResolutionParseError {
    #[error("invalid resolution format: {0}, expected 'WxH'")]
    InvalidFormat(String),
    #[error("invalid number in resolution: {0}")]
    InvalidNumber(String),
    #[error("resolution cannot have zero dimensions")]
    ZeroValue,
    #[error("resolution {0}x{1} has an odd dimension; alpha pixel formats require even sizes")]
    OddDimension(u32, u32),
}

/// Mask obtained from the segmentation service for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MaskResult {
    /// URL of the mask video (single-channel-equivalent luminance)
    pub mask_url: String,
    /// Track identifier assigned by the service, empty if not provided
    #[serde(default)]
    pub track_id: String,
}

/// Public request for an alpha export.
///
/// `output_format` stays a string at this boundary so an unsupported value
/// fails with a format error before any network call is made.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportRequest {
    /// URL of the source video
    pub video_url: String,
    /// Owning project
    pub project_id: String,
    /// Base name for the deliverable
    pub export_name: String,
    /// Segmentation hints (tagged by `segmentation_method`)
    #[serde(flatten)]
    pub intent: SegmentationIntent,
    /// Requested output format id (`png_sequence`, `prores4444`, `webm_alpha`)
    pub output_format: String,
    /// Frame-rate override for the deliverable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    /// Output resolution override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl ExportRequest {
    pub fn new(
        video_url: impl Into<String>,
        project_id: impl Into<String>,
        export_name: impl Into<String>,
        intent: SegmentationIntent,
        output_format: OutputFormat,
    ) -> Self {
        Self {
            video_url: video_url.into(),
            project_id: project_id.into(),
            export_name: export_name.into(),
            intent,
            output_format: output_format.as_str().to_string(),
            frame_rate: None,
            resolution: None,
        }
    }
}

/// What the encoder produced for one job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportArtifact {
    /// Encoded file, or the frames directory for PNG sequences
    pub output_path: PathBuf,
    /// Number of PNGs actually written (PNG sequence only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<u64>,
    /// Deliverable duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

/// Externally visible result of a completed export.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportResult {
    pub export_id: String,
    pub format: OutputFormat,
    pub output_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    /// Mask used for the luma-matte merge
    pub mask_url: String,
}

/// One named subject in a batch segmentation call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubjectSpec {
    pub name: String,
    #[serde(flatten)]
    pub intent: SegmentationIntent,
}

impl SubjectSpec {
    pub fn new(name: impl Into<String>, intent: SegmentationIntent) -> Self {
        Self {
            name: name.into(),
            intent,
        }
    }
}

/// Mask obtained for one subject of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchSegmentationRecord {
    pub subject_name: String,
    pub mask_url: String,
}
