//! Export pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use vibe_segmentation::SegmentationConfig;

/// Configuration for the export pipeline and its collaborators.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Root directory for job directories (`<root>/<project>/<export_id>`)
    pub export_root: PathBuf,
    /// Segmentation service settings
    pub segmentation: SegmentationConfig,
    /// Parallelism for the source/mask fetches; 1 means sequential
    pub fetch_concurrency: usize,
    /// Parallelism for batch segmentation; 1 means sequential
    pub batch_concurrency: usize,
    /// Per-stage deadline; a stage exceeding it cancels the job
    pub stage_timeout: Option<Duration>,
    /// Default age for `cleanup_exports`, in days
    pub retention_days: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_root: PathBuf::from("./exports"),
            segmentation: SegmentationConfig::default(),
            fetch_concurrency: 1,
            batch_concurrency: 1,
            stage_timeout: None,
            retention_days: 7,
        }
    }
}

impl ExportConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            export_root: std::env::var("EXPORT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./exports")),
            segmentation: SegmentationConfig::from_env(),
            fetch_concurrency: std::env::var("EXPORT_FETCH_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            batch_concurrency: std::env::var("EXPORT_BATCH_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            stage_timeout: std::env::var("EXPORT_STAGE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            retention_days: std::env::var("EXPORT_RETENTION_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_observed_behavior() {
        let config = ExportConfig::default();
        assert_eq!(config.fetch_concurrency, 1);
        assert_eq!(config.batch_concurrency, 1);
        assert_eq!(config.retention_days, 7);
        assert!(config.stage_timeout.is_none());
    }
}
