//! Public facade for the export subsystem.
//!
//! An explicit service value constructed once at startup and passed by
//! handle to callers; there is no hidden global instance.

use std::sync::Arc;
use std::time::Duration;

use vibe_models::{BatchSegmentationRecord, ExportRequest, ExportResult, FormatInfo, SubjectSpec};
use vibe_segmentation::SegmentationClient;

use crate::batch::BatchSegmenter;
use crate::config::ExportConfig;
use crate::error::PipelineResult;
use crate::pipeline::AlphaExportPipeline;
use crate::retention::RetentionSweeper;

/// The operations the rest of the application calls.
pub struct AlphaExportService {
    pipeline: AlphaExportPipeline,
    batch: BatchSegmenter,
    sweeper: RetentionSweeper,
    retention_days: u32,
}

impl AlphaExportService {
    /// Create the service from configuration.
    pub fn new(config: ExportConfig) -> PipelineResult<Self> {
        let segmentation = Arc::new(SegmentationClient::new(config.segmentation.clone())?);
        let batch = BatchSegmenter::new(segmentation.clone(), config.batch_concurrency);
        let sweeper = RetentionSweeper::new(config.export_root.clone());
        let retention_days = config.retention_days;
        let pipeline = AlphaExportPipeline::new(config, segmentation);

        Ok(Self {
            pipeline,
            batch,
            sweeper,
            retention_days,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> PipelineResult<Self> {
        Self::new(ExportConfig::from_env())
    }

    /// Export one video with an alpha channel.
    pub async fn export_with_alpha(&self, request: &ExportRequest) -> PipelineResult<ExportResult> {
        self.pipeline.run(request).await
    }

    /// Extract one mask per named subject from a single video.
    pub async fn batch_segment(
        &self,
        video_url: &str,
        subjects: &[SubjectSpec],
    ) -> PipelineResult<Vec<BatchSegmentationRecord>> {
        self.batch.run(video_url, subjects).await
    }

    /// Static catalog of deliverable formats.
    pub fn available_formats(&self) -> &'static [FormatInfo] {
        vibe_models::format::available_formats()
    }

    /// Delete job directories older than the given number of days
    /// (defaults to the configured retention, 7 days out of the box).
    pub async fn cleanup_exports(&self, older_than_days: Option<u32>) -> PipelineResult<u64> {
        let days = older_than_days.unwrap_or(self.retention_days);
        let max_age = Duration::from_secs(u64::from(days) * 24 * 60 * 60);
        self.sweeper.sweep(max_age).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_formats_catalog() {
        let service = AlphaExportService::new(ExportConfig::default()).unwrap();
        let formats = service.available_formats();
        assert_eq!(formats.len(), 3);
        assert!(formats.iter().any(|f| f.id == "prores4444" && f.extension == "mov"));
    }
}
