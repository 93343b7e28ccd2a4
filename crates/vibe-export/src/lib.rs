//! Alpha-matte export pipeline.
//!
//! This crate provides:
//! - [`AlphaExportPipeline`]: the segment → fetch → encode state machine
//! - [`BatchSegmenter`]: per-subject mask extraction for one video
//! - [`RetentionSweeper`]: age-based cleanup of job directories
//! - [`AlphaExportService`]: the facade the rest of the application calls

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod retention;
pub mod service;

pub use batch::BatchSegmenter;
pub use config::ExportConfig;
pub use error::{ExportError, PipelineResult};
pub use pipeline::AlphaExportPipeline;
pub use retention::RetentionSweeper;
pub use service::AlphaExportService;
