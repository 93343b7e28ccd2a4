//! Output format definitions and the static deliverable catalog.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Alpha-preserving deliverable formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One RGBA PNG per frame, in a `frames/` subdirectory
    PngSequence,
    /// Apple ProRes 4444 in a .mov container (10-bit 4:4:4 with alpha)
    #[serde(rename = "prores4444")]
    ProRes4444,
    /// VP9 in a .webm container (8-bit alpha, web playback)
    WebmAlpha,
}

impl OutputFormat {
    /// All supported formats.
    pub const ALL: &'static [OutputFormat] = &[
        OutputFormat::PngSequence,
        OutputFormat::ProRes4444,
        OutputFormat::WebmAlpha,
    ];

    /// Stable identifier used in requests and filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::PngSequence => "png_sequence",
            OutputFormat::ProRes4444 => "prores4444",
            OutputFormat::WebmAlpha => "webm_alpha",
        }
    }

    /// File extension of the deliverable.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::PngSequence => "png",
            OutputFormat::ProRes4444 => "mov",
            OutputFormat::WebmAlpha => "webm",
        }
    }

    /// Whether the deliverable is a single container file (vs. a directory).
    pub fn is_container(&self) -> bool {
        !matches!(self, OutputFormat::PngSequence)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png_sequence" => Ok(OutputFormat::PngSequence),
            "prores4444" => Ok(OutputFormat::ProRes4444),
            "webm_alpha" => Ok(OutputFormat::WebmAlpha),
            _ => Err(FormatParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown output format: {0}")]
pub struct FormatParseError(pub String);

/// Catalog entry describing one deliverable format.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FormatInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub extension: &'static str,
}

/// Static catalog of available export formats.
pub fn available_formats() -> &'static [FormatInfo] {
    static CATALOG: &[FormatInfo] = &[
        FormatInfo {
            id: "png_sequence",
            name: "PNG sequence",
            description: "One RGBA PNG per frame, for frame-accurate compositing",
            extension: "png",
        },
        FormatInfo {
            id: "prores4444",
            name: "ProRes 4444",
            description: "10-bit 4:4:4 .mov with alpha, for professional compositing tools",
            extension: "mov",
        },
        FormatInfo {
            id: "webm_alpha",
            name: "WebM alpha",
            description: "VP9 .webm with 8-bit alpha, for web playback",
            extension: "webm",
        },
    ];
    CATALOG
}
