//! FFprobe wrappers for stream and container metadata.

use std::path::Path;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Metadata of the first video stream of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProbe {
    pub width: u32,
    pub height: u32,
    /// Effective frame rate (e.g. 23.976 for "24000/1001")
    pub frame_rate: f64,
    /// Declared frame count; absent for some containers
    pub frame_count: Option<u64>,
    /// Stream duration in seconds, if declared
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FormatOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Probe the first video stream of `path`.
pub async fn probe_video(path: &Path) -> MediaResult<VideoProbe> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let stdout = run_ffprobe(&[
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=width,height,r_frame_rate,nb_frames,duration",
        "-of",
        "json",
    ], path)
    .await?;

    parse_video_probe(&stdout, path)
}

/// Read back the container duration of an encoded file, in seconds.
pub async fn probe_duration(path: &Path) -> MediaResult<f64> {
    let stdout = run_ffprobe(&[
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "json",
    ], path)
    .await?;

    parse_container_duration(&stdout)
}

async fn run_ffprobe(args: &[&str], path: &Path) -> MediaResult<String> {
    let ffprobe = which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    debug!(path = %path.display(), "running ffprobe");

    let output = Command::new(ffprobe).args(args).arg(path).output().await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("ffprobe exited with {:?} for {}", output.status.code(), path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_video_probe(json: &str, path: &Path) -> MediaResult<VideoProbe> {
    let parsed: ProbeOutput = serde_json::from_str(json)?;
    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;

    let frame_rate = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .ok_or_else(|| MediaError::FfprobeFailed {
            message: format!("no usable frame rate for {}", path.display()),
            stderr: None,
        })?;

    Ok(VideoProbe {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
        frame_rate,
        frame_count: stream.nb_frames.and_then(|s| s.parse().ok()),
        duration_seconds: stream.duration.and_then(|s| s.parse().ok()),
    })
}

fn parse_container_duration(json: &str) -> MediaResult<f64> {
    let parsed: FormatOutput = serde_json::from_str(json)?;
    parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| MediaError::FfprobeFailed {
            message: "container reports no duration".to_string(),
            stderr: None,
        })
}

/// Parse an ffprobe rational frame rate like "24000/1001" or "25/1".
fn parse_frame_rate(raw: &str) -> Option<f64> {
    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 || num <= 0.0 {
            return None;
        }
        return Some(num / den);
    }
    raw.parse().ok().filter(|v: &f64| *v > 0.0)
}
