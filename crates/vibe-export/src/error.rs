//! Pipeline error types.

use thiserror::Error;

use vibe_media::MediaError;
use vibe_models::{FormatParseError, IntentError, JobState};
use vibe_segmentation::SegmentationError;

pub type PipelineResult<T> = Result<T, ExportError>;

/// Stage-qualified export failures.
///
/// Every failure aborts the current run; nothing is retried by the
/// pipeline itself. Partial artifacts stay on disk for the retention
/// sweep to reclaim.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    UnknownFormat(#[from] FormatParseError),

    #[error("invalid segmentation intent: {0}")]
    InvalidIntent(#[from] IntentError),

    #[error("segmentation failed: {0}")]
    Segmentation(#[from] SegmentationError),

    #[error("media fetch failed: {0}")]
    Fetch(#[source] MediaError),

    #[error("encode failed: {0}")]
    Encode(#[source] MediaError),

    #[error("subject '{name}' failed: {source}")]
    Subject {
        name: String,
        #[source]
        source: SegmentationError,
    },

    #[error("subject '{0}' segmentation did not complete")]
    SubjectIncomplete(String),

    #[error("export cancelled: stage deadline exceeded")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// The state the job was in when this failure aborted it, if the
    /// failure belongs to a pipeline stage.
    pub fn stage(&self) -> Option<JobState> {
        match self {
            ExportError::Segmentation(_)
            | ExportError::Subject { .. }
            | ExportError::SubjectIncomplete(_) => Some(JobState::Segmenting),
            ExportError::Fetch(_) => Some(JobState::Fetching),
            ExportError::Encode(_) => Some(JobState::Encoding),
            ExportError::Cancelled => Some(JobState::Cancelled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_qualification() {
        let err = ExportError::Fetch(MediaError::download_failed("404"));
        assert_eq!(err.stage(), Some(JobState::Fetching));

        let err: ExportError = FormatParseError("gif".to_string()).into();
        assert_eq!(err.stage(), None);
        assert!(err.to_string().contains("gif"));
    }
}
