//! Pure mapping from segmentation intents to service requests.
//!
//! The service accepts per-frame point/box sets for video, but the product
//! only ever prompts on a single keyframe, so video hints are always
//! emitted for frame 0.

use vibe_models::SegmentationIntent;

use crate::types::{FrameBox, FramePoints, ImageSegmentRequest, VideoSegmentRequest};

/// Build the video-segmentation request for an intent.
pub fn build_video_request(video_url: &str, intent: &SegmentationIntent) -> VideoSegmentRequest {
    let mut request = VideoSegmentRequest {
        video_url: video_url.to_string(),
        points_per_frame: None,
        box_per_frame: None,
    };

    match intent {
        SegmentationIntent::Automatic => {}
        SegmentationIntent::Points { points } => {
            request.points_per_frame = Some(vec![FramePoints {
                frame: 0,
                points: points.iter().map(|p| [p.x, p.y]).collect(),
                labels: points.iter().map(|p| p.label.as_wire()).collect(),
            }]);
        }
        SegmentationIntent::Box { region } => {
            request.box_per_frame = Some(vec![FrameBox {
                frame: 0,
                region: [region.x1, region.y1, region.x2, region.y2],
            }]);
        }
    }

    request
}

/// Build the image-segmentation request for an intent.
pub fn build_image_request(image_url: &str, intent: &SegmentationIntent) -> ImageSegmentRequest {
    let mut request = ImageSegmentRequest {
        image_url: image_url.to_string(),
        points: None,
        point_labels: None,
        region: None,
    };

    match intent {
        SegmentationIntent::Automatic => {}
        SegmentationIntent::Points { points } => {
            request.points = Some(points.iter().map(|p| [p.x, p.y]).collect());
            request.point_labels = Some(points.iter().map(|p| p.label.as_wire()).collect());
        }
        SegmentationIntent::Box { region } => {
            request.region = Some([region.x1, region.y1, region.x2, region.y2]);
        }
    }

    request
}
