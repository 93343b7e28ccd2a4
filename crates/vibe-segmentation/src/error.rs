//! Segmentation client error types.

use thiserror::Error;

pub type SegResult<T> = Result<T, SegmentationError>;

#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("segmentation service returned {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("segmentation response missing mask media field")]
    MissingMask,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SegmentationError {
    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            body: body.into(),
        }
    }
}
