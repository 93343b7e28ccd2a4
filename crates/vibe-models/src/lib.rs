//! Shared data models for the VibeBoard alpha-matte export backend.
//!
//! This crate provides Serde-serializable types for:
//! - Segmentation intents (automatic / point prompts / bounding box)
//! - Output formats and the static format catalog
//! - Export jobs, requests, artifacts and results

pub mod export;
pub mod format;
pub mod intent;
pub mod job;

// Re-export common types
pub use export::{
    BatchSegmentationRecord, ExportArtifact, ExportRequest, ExportResult, MaskResult, Resolution,
    ResolutionParseError, SubjectSpec,
};
pub use format::{available_formats, FormatInfo, FormatParseError, OutputFormat};
pub use intent::{BoundingBox, IntentError, PointLabel, PointPrompt, SegmentationIntent};
pub use job::{ExportId, ExportJob, JobState};
