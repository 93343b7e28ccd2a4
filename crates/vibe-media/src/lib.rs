//! Media I/O and FFmpeg wrapper for alpha-matte exports.
//!
//! This crate provides:
//! - [`MediaFetcher`]: HTTP download of remote media into scratch files
//! - [`probe`]: ffprobe wrappers for stream and container metadata
//! - [`ExportEncoder`]: the luma-matte merge encode into the three
//!   alpha-preserving deliverable formats

pub mod encode;
pub mod error;
pub mod fetch;
pub mod probe;

pub use encode::{EncoderOptions, ExportEncoder};
pub use error::{MediaError, MediaResult};
pub use fetch::MediaFetcher;
pub use probe::{probe_duration, probe_video, VideoProbe};
