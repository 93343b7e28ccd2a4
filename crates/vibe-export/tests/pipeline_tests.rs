//! Export pipeline integration tests against a fake segmentation service.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vibe_export::{AlphaExportService, ExportConfig, ExportError};
use vibe_models::{ExportRequest, JobState, OutputFormat, SegmentationIntent};
use vibe_segmentation::SegmentationConfig;

fn service_for(server: &MockServer, export_root: &std::path::Path) -> AlphaExportService {
    AlphaExportService::new(ExportConfig {
        export_root: export_root.to_path_buf(),
        segmentation: SegmentationConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
        },
        ..ExportConfig::default()
    })
    .expect("service construction")
}

fn png_request(server: &MockServer) -> ExportRequest {
    ExportRequest::new(
        format!("{}/source.mp4", server.uri()),
        "proj_1",
        "hero_cutout",
        SegmentationIntent::Automatic,
        OutputFormat::PngSequence,
    )
}

/// List the job directories created under one project.
fn job_dirs(root: &std::path::Path, project: &str) -> Vec<std::path::PathBuf> {
    let project_dir = root.join(project);
    if !project_dir.exists() {
        return vec![];
    }
    std::fs::read_dir(project_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect()
}

#[tokio::test]
async fn unsupported_format_fails_before_any_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/segment/video"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let service = service_for(&server, root.path());

    let mut request = png_request(&server);
    request.output_format = "gif".to_string();

    let err = service.export_with_alpha(&request).await.unwrap_err();
    assert!(matches!(err, ExportError::UnknownFormat(_)));
    assert!(err.to_string().contains("gif"));

    // no job directory was allocated either
    assert!(job_dirs(root.path(), "proj_1").is_empty());
}

#[tokio::test]
async fn invalid_intent_fails_before_any_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/segment/video"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let service = service_for(&server, root.path());

    let mut request = png_request(&server);
    // empty point list can only arrive via deserialized input
    request.intent = SegmentationIntent::Points { points: vec![] };

    let err = service.export_with_alpha(&request).await.unwrap_err();
    assert!(matches!(err, ExportError::InvalidIntent(_)));
}

#[tokio::test]
async fn segmentation_without_mask_field_fails_with_empty_job_dir() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/segment/video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"track_id": "trk_1"})))
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let service = service_for(&server, root.path());

    let err = service.export_with_alpha(&png_request(&server)).await.unwrap_err();
    assert!(matches!(err, ExportError::Segmentation(_)));
    assert_eq!(err.stage(), Some(JobState::Segmenting));

    // the job directory exists but contains no source/mask files
    let dirs = job_dirs(root.path(), "proj_1");
    assert_eq!(dirs.len(), 1);
    let contents: Vec<_> = std::fs::read_dir(&dirs[0]).unwrap().collect();
    assert!(contents.is_empty());
}

#[tokio::test]
async fn mask_fetch_failure_leaves_fetched_source_in_place() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/segment/video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video": {"url": format!("{}/mask.webm", server.uri())},
            "track_id": "trk_1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/source.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake source".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mask.webm"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let service = service_for(&server, root.path());

    let err = service.export_with_alpha(&png_request(&server)).await.unwrap_err();
    assert!(matches!(err, ExportError::Fetch(_)));
    assert_eq!(err.stage(), Some(JobState::Fetching));

    // fetches are sequential by default; the source landed, the mask did not,
    // and the partial state stays on disk for retention to reclaim
    let dirs = job_dirs(root.path(), "proj_1");
    assert_eq!(dirs.len(), 1);
    assert!(dirs[0].join("source.mp4").exists());
    assert!(!dirs[0].join("mask.webm").exists());
}

#[tokio::test]
async fn concurrent_fetches_land_both_files_before_encoding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/segment/video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video": {"url": format!("{}/mask.webm", server.uri())},
            "track_id": "trk_1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/source.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake source".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mask.webm"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake mask".to_vec()))
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let service = AlphaExportService::new(ExportConfig {
        export_root: root.path().to_path_buf(),
        segmentation: SegmentationConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
        },
        fetch_concurrency: 2,
        ..ExportConfig::default()
    })
    .unwrap();

    // the inputs are not real media, so the run stops at the encode stage;
    // what matters here is that both concurrent fetches completed first
    let err = service.export_with_alpha(&png_request(&server)).await.unwrap_err();
    assert!(matches!(err, ExportError::Encode(_)));
    assert_eq!(err.stage(), Some(JobState::Encoding));

    let dirs = job_dirs(root.path(), "proj_1");
    assert_eq!(dirs.len(), 1);
    assert_eq!(std::fs::read(dirs[0].join("source.mp4")).unwrap(), b"fake source");
    assert_eq!(std::fs::read(dirs[0].join("mask.webm")).unwrap(), b"fake mask");
}

#[tokio::test]
async fn stage_deadline_cancels_the_job() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/segment/video"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"video": {"url": "https://cdn.example.com/m.webm"}}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let service = AlphaExportService::new(ExportConfig {
        export_root: root.path().to_path_buf(),
        segmentation: SegmentationConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(30),
        },
        stage_timeout: Some(Duration::from_millis(100)),
        ..ExportConfig::default()
    })
    .unwrap();

    let err = service.export_with_alpha(&png_request(&server)).await.unwrap_err();
    assert!(matches!(err, ExportError::Cancelled));
    assert_eq!(err.stage(), Some(JobState::Cancelled));
}
