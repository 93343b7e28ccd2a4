//! Matting service HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use vibe_models::{MaskResult, SegmentationIntent};

use crate::error::{SegResult, SegmentationError};
use crate::request::{build_image_request, build_video_request};
use crate::types::{ImageSegmentResponse, VideoSegmentResponse};

/// Configuration for the segmentation client.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// Base URL of the matting service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_string(),
            timeout: Duration::from_secs(600), // video matting is slow
        }
    }
}

impl SegmentationConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("SEGMENT_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8002".to_string()),
            timeout: Duration::from_secs(
                std::env::var("SEGMENT_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
        }
    }
}

/// Client for the external matting service.
///
/// Each operation is a single synchronous call; failures are not retried
/// here, retry policy belongs to the caller.
pub struct SegmentationClient {
    http: Client,
    config: SegmentationConfig,
}

impl SegmentationClient {
    /// Create a new segmentation client.
    pub fn new(config: SegmentationConfig) -> SegResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SegmentationError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> SegResult<Self> {
        Self::new(SegmentationConfig::from_env())
    }

    /// Segment a video, returning the mask video reference and track id.
    pub async fn segment_video(
        &self,
        video_url: &str,
        intent: &SegmentationIntent,
    ) -> SegResult<MaskResult> {
        let url = format!("{}/segment/video", self.config.base_url);
        let request = build_video_request(video_url, intent);

        debug!(%video_url, "sending video segmentation request");

        let response = self.http.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "video segmentation request failed");
            return Err(SegmentationError::request_failed(status, body));
        }

        let parsed: VideoSegmentResponse = response.json().await?;
        for note in &parsed.progress {
            debug!(progress = %note, "segmentation service progress");
        }

        let mask = parsed.video.ok_or(SegmentationError::MissingMask)?;
        Ok(MaskResult {
            mask_url: mask.url,
            track_id: parsed.track_id.unwrap_or_default(),
        })
    }

    /// Segment a single image, returning the mask image URL.
    pub async fn segment_image(
        &self,
        image_url: &str,
        intent: &SegmentationIntent,
    ) -> SegResult<String> {
        let url = format!("{}/segment/image", self.config.base_url);
        let request = build_image_request(image_url, intent);

        debug!(%image_url, "sending image segmentation request");

        let response = self.http.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "image segmentation request failed");
            return Err(SegmentationError::request_failed(status, body));
        }

        let parsed: ImageSegmentResponse = response.json().await?;
        for note in &parsed.progress {
            debug!(progress = %note, "segmentation service progress");
        }

        let mask = parsed.image.ok_or(SegmentationError::MissingMask)?;
        Ok(mask.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SegmentationClient {
        SegmentationClient::new(SegmentationConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = SegmentationConfig::default();
        assert_eq!(config.base_url, "http://localhost:8002");
        assert_eq!(config.timeout, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_segment_video_returns_mask() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/segment/video"))
            .and(body_partial_json(
                json!({"video_url": "https://cdn.example.com/v.mp4"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "video": {"url": "https://cdn.example.com/mask.webm"},
                "track_id": "trk_42",
                "progress": ["propagating masks", "encoding mask video"]
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .segment_video("https://cdn.example.com/v.mp4", &SegmentationIntent::Automatic)
            .await
            .unwrap();

        assert_eq!(result.mask_url, "https://cdn.example.com/mask.webm");
        assert_eq!(result.track_id, "trk_42");
    }

    #[tokio::test]
    async fn test_missing_mask_field_is_hard_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/segment/video"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"track_id": "trk_1"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .segment_video("https://cdn.example.com/v.mp4", &SegmentationIntent::Automatic)
            .await
            .unwrap_err();

        assert!(matches!(err, SegmentationError::MissingMask));
    }

    #[tokio::test]
    async fn test_service_error_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/segment/video"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .segment_video("https://cdn.example.com/v.mp4", &SegmentationIntent::Automatic)
            .await
            .unwrap_err();

        match err {
            SegmentationError::RequestFailed { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "model loading");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_segment_image_returns_mask_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/segment/image"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "image": {"url": "https://cdn.example.com/mask.png"}
            })))
            .mount(&server)
            .await;

        let url = client_for(&server)
            .segment_image("https://cdn.example.com/f.png", &SegmentationIntent::Automatic)
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example.com/mask.png");
    }

    #[tokio::test]
    async fn test_absent_track_id_defaults_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/segment/video"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "video": {"url": "https://cdn.example.com/mask.webm"}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .segment_video("https://cdn.example.com/v.mp4", &SegmentationIntent::Automatic)
            .await
            .unwrap();

        assert_eq!(result.track_id, "");
    }
}
