//! The alpha-matte export state machine.
//!
//! One `run` call drives one job through
//! `Created → Segmenting → Fetching → Encoding → Completed`, with `Failed`
//! and `Cancelled` as terminal states reachable from any non-terminal one.
//! Jobs are never resumed; a retry is a fresh job with a fresh directory.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use vibe_media::{EncoderOptions, ExportEncoder, MediaFetcher};
use vibe_models::{
    ExportJob, ExportRequest, ExportResult, JobState, MaskResult, OutputFormat,
};
use vibe_segmentation::SegmentationClient;

use crate::config::ExportConfig;
use crate::error::{ExportError, PipelineResult};

/// Orchestrates one export: segmentation, media fetch, encode.
pub struct AlphaExportPipeline {
    config: ExportConfig,
    segmentation: Arc<SegmentationClient>,
    fetcher: MediaFetcher,
    encoder: ExportEncoder,
}

impl AlphaExportPipeline {
    pub fn new(config: ExportConfig, segmentation: Arc<SegmentationClient>) -> Self {
        Self {
            config,
            segmentation,
            fetcher: MediaFetcher::new(),
            encoder: ExportEncoder::new(),
        }
    }

    /// Run one export end to end.
    ///
    /// The requested format and intent are validated before any network
    /// call or directory creation. On failure the job directory and any
    /// partial artifacts stay on disk until the retention sweep.
    pub async fn run(&self, request: &ExportRequest) -> PipelineResult<ExportResult> {
        let format: OutputFormat = request.output_format.parse()?;
        request.intent.validate()?;

        let job = ExportJob::new(
            &self.config.export_root,
            &request.project_id,
            &request.export_name,
            format,
        );
        tokio::fs::create_dir_all(&job.work_dir).await?;

        info!(
            export_id = %job.id,
            project_id = %job.project_id,
            %format,
            "export job created"
        );

        match self.execute(&job, request, format).await {
            Ok(result) => {
                info!(export_id = %job.id, state = %JobState::Completed, "export finished");
                Ok(result)
            }
            Err(e) => {
                let terminal = match &e {
                    ExportError::Cancelled => JobState::Cancelled,
                    _ => JobState::Failed,
                };
                error!(
                    export_id = %job.id,
                    state = %terminal,
                    stage = ?e.stage(),
                    error = %e,
                    "export aborted"
                );
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        job: &ExportJob,
        request: &ExportRequest,
        format: OutputFormat,
    ) -> PipelineResult<ExportResult> {
        self.transition(job, JobState::Created, JobState::Segmenting);
        let mask = self
            .bounded(async {
                self.segmentation
                    .segment_video(&request.video_url, &request.intent)
                    .await
                    .map_err(ExportError::from)
            })
            .await?;

        self.transition(job, JobState::Segmenting, JobState::Fetching);
        let (source_path, mask_path) = self
            .bounded(self.fetch_media(job, &request.video_url, &mask))
            .await?;

        self.transition(job, JobState::Fetching, JobState::Encoding);
        let options = EncoderOptions {
            frame_rate: request.frame_rate,
            resolution: request.resolution,
        };
        let artifact = self
            .bounded(async {
                self.encoder
                    .encode(
                        format,
                        &source_path,
                        &mask_path,
                        &job.work_dir,
                        &job.export_name,
                        &options,
                    )
                    .await
                    .map_err(ExportError::Encode)
            })
            .await?;

        self.transition(job, JobState::Encoding, JobState::Completed);
        Ok(ExportResult {
            export_id: job.id.to_string(),
            format,
            output_path: artifact.output_path,
            frame_count: artifact.frame_count,
            duration_seconds: artifact.duration_seconds,
            mask_url: mask.mask_url,
        })
    }

    /// Fetch source and mask into the job directory as sibling files.
    async fn fetch_media(
        &self,
        job: &ExportJob,
        video_url: &str,
        mask: &MaskResult,
    ) -> PipelineResult<(std::path::PathBuf, std::path::PathBuf)> {
        let source_path = job
            .work_dir
            .join(format!("source.{}", extension_from_url(video_url)));
        let mask_path = job
            .work_dir
            .join(format!("mask.{}", extension_from_url(&mask.mask_url)));

        if self.config.fetch_concurrency > 1 {
            tokio::try_join!(
                self.fetcher.fetch(video_url, &source_path),
                self.fetcher.fetch(&mask.mask_url, &mask_path),
            )
            .map_err(ExportError::Fetch)?;
        } else {
            self.fetcher
                .fetch(video_url, &source_path)
                .await
                .map_err(ExportError::Fetch)?;
            self.fetcher
                .fetch(&mask.mask_url, &mask_path)
                .await
                .map_err(ExportError::Fetch)?;
        }

        Ok((source_path, mask_path))
    }

    /// Run a stage under the configured deadline; elapse cancels the job.
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = PipelineResult<T>>,
    ) -> PipelineResult<T> {
        match self.config.stage_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| ExportError::Cancelled)?,
            None => fut.await,
        }
    }

    fn transition(&self, job: &ExportJob, from: JobState, to: JobState) {
        info!(export_id = %job.id, %from, %to, "export state");
    }
}

/// Extension of the last path segment of a URL, ignoring query/fragment.
/// Falls back to `mp4` when the URL carries no usable extension.
fn extension_from_url(url: &str) -> String {
    let trimmed = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .rsplit('/')
        .next()
        .unwrap_or("");

    Path::new(trimmed)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "mp4".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_url() {
        assert_eq!(extension_from_url("https://cdn.example.com/v.mp4"), "mp4");
        assert_eq!(
            extension_from_url("https://cdn.example.com/mask.WebM?sig=abc"),
            "webm"
        );
        assert_eq!(extension_from_url("https://cdn.example.com/stream"), "mp4");
        assert_eq!(extension_from_url("https://cdn.example.com/"), "mp4");
    }
}
