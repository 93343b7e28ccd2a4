//! Client for the external video/image matting service.
//!
//! This crate provides:
//! - Pure request builders turning a [`vibe_models::SegmentationIntent`]
//!   into the service's wire shape
//! - A thin HTTP client that normalizes responses into mask results
//!
//! The client performs a single call per operation and never retries;
//! retry policy belongs to the caller.

pub mod client;
pub mod error;
pub mod request;
pub mod types;

pub use client::{SegmentationClient, SegmentationConfig};
pub use error::{SegResult, SegmentationError};
pub use request::{build_image_request, build_video_request};
