//! Luma-matte alpha encoding via FFmpeg.
//!
//! Every variant merges the source video's color with the mask video's
//! luminance as the alpha channel: `[1:v]format=gray[alpha];
//! [0:v][alpha]alphamerge[out]`. The mask's color data is discarded.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use vibe_models::{ExportArtifact, OutputFormat, Resolution};

use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_duration, probe_video};

/// Fixed VP9 target bitrate for web-playback exports.
const WEBM_BITRATE: &str = "4M";

/// Per-export encoder knobs.
#[derive(Debug, Clone, Default)]
pub struct EncoderOptions {
    /// Output frame-rate override; defaults to the source's probed rate
    pub frame_rate: Option<f64>,
    /// Output resolution override; defaults to the source resolution
    pub resolution: Option<Resolution>,
}

/// Invokes the external transcoder with format-specific parameters.
#[derive(Debug, Clone, Default)]
pub struct ExportEncoder;

impl ExportEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode the synchronized source + mask pair into `format`.
    ///
    /// `work_dir` receives either a `frames/` subdirectory (PNG sequence)
    /// or a single `<export_name>.<ext>` file. Partial output is left in
    /// place on failure; the retention sweep reclaims it later.
    pub async fn encode(
        &self,
        format: OutputFormat,
        source: &Path,
        mask: &Path,
        work_dir: &Path,
        export_name: &str,
        options: &EncoderOptions,
    ) -> MediaResult<ExportArtifact> {
        match format {
            OutputFormat::PngSequence => {
                self.encode_png_sequence(source, mask, work_dir, options).await
            }
            OutputFormat::ProRes4444 => {
                let output = work_dir.join(format!("{export_name}.mov"));
                let args = prores_args(source, mask, &output, options);
                self.encode_container(&output, args).await
            }
            OutputFormat::WebmAlpha => {
                let output = work_dir.join(format!("{export_name}.webm"));
                let args = webm_args(source, mask, &output, options);
                self.encode_container(&output, args).await
            }
        }
    }

    async fn encode_png_sequence(
        &self,
        source: &Path,
        mask: &Path,
        work_dir: &Path,
        options: &EncoderOptions,
    ) -> MediaResult<ExportArtifact> {
        // Probed rate and declared frame count are for reporting only; the
        // artifact reports what actually landed on disk.
        let probe = probe_video(source).await?;
        let effective_fps = options.frame_rate.unwrap_or(probe.frame_rate);
        debug!(
            probed_fps = probe.frame_rate,
            declared_frames = ?probe.frame_count,
            "encoding PNG sequence"
        );

        let frames_dir = work_dir.join("frames");
        tokio::fs::create_dir_all(&frames_dir).await?;

        let args = png_sequence_args(source, mask, &frames_dir, options);
        run_ffmpeg(&args).await?;

        let frame_count = count_frames(&frames_dir)?;
        let duration_seconds = if effective_fps > 0.0 {
            Some(frame_count as f64 / effective_fps)
        } else {
            None
        };

        info!(frame_count, "PNG sequence encoded");

        Ok(ExportArtifact {
            output_path: frames_dir,
            frame_count: Some(frame_count),
            duration_seconds,
        })
    }

    async fn encode_container(
        &self,
        output: &Path,
        args: Vec<String>,
    ) -> MediaResult<ExportArtifact> {
        run_ffmpeg(&args).await?;

        // Ground truth duration comes from the encoded container, not from
        // any computation over the inputs.
        let duration_seconds = probe_duration(output).await?;

        info!(output = %output.display(), duration_seconds, "container encoded");

        Ok(ExportArtifact {
            output_path: output.to_path_buf(),
            frame_count: None,
            duration_seconds: Some(duration_seconds),
        })
    }
}

/// Filter graph merging source color with mask luminance as alpha.
fn alpha_merge_filter(resolution: Option<Resolution>) -> String {
    match resolution {
        Some(res) => format!(
            "[1:v]format=gray[alpha];[0:v][alpha]alphamerge,scale={}:{}[out]",
            res.width, res.height
        ),
        None => "[1:v]format=gray[alpha];[0:v][alpha]alphamerge[out]".to_string(),
    }
}

fn base_args(source: &Path, mask: &Path, options: &EncoderOptions) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        source.display().to_string(),
        "-i".to_string(),
        mask.display().to_string(),
        "-filter_complex".to_string(),
        alpha_merge_filter(options.resolution),
        "-map".to_string(),
        "[out]".to_string(),
        "-an".to_string(),
    ];
    if let Some(fps) = options.frame_rate {
        args.push("-r".to_string());
        args.push(fps.to_string());
    }
    args
}

fn png_sequence_args(
    source: &Path,
    mask: &Path,
    frames_dir: &Path,
    options: &EncoderOptions,
) -> Vec<String> {
    let mut args = base_args(source, mask, options);
    args.extend([
        "-pix_fmt".to_string(),
        "rgba".to_string(),
        frames_dir.join("frame_%06d.png").display().to_string(),
    ]);
    args
}

fn prores_args(source: &Path, mask: &Path, output: &Path, options: &EncoderOptions) -> Vec<String> {
    let mut args = base_args(source, mask, options);
    args.extend([
        "-c:v".to_string(),
        "prores_ks".to_string(),
        "-profile:v".to_string(),
        "4444".to_string(),
        "-pix_fmt".to_string(),
        "yuva444p10le".to_string(),
        output.display().to_string(),
    ]);
    args
}

fn webm_args(source: &Path, mask: &Path, output: &Path, options: &EncoderOptions) -> Vec<String> {
    let mut args = base_args(source, mask, options);
    args.extend([
        "-c:v".to_string(),
        "libvpx-vp9".to_string(),
        "-pix_fmt".to_string(),
        "yuva420p".to_string(),
        "-b:v".to_string(),
        WEBM_BITRATE.to_string(),
        "-auto-alt-ref".to_string(),
        "0".to_string(),
        output.display().to_string(),
    ]);
    args
}

async fn run_ffmpeg(args: &[String]) -> MediaResult<()> {
    let ffmpeg = which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    debug!(?args, "running ffmpeg");

    let output = Command::new(ffmpeg).args(args).output().await?;
    if !output.status.success() {
        return Err(MediaError::ffmpeg_failed(
            "alpha merge encode failed",
            Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            output.status.code(),
        ));
    }
    Ok(())
}

/// Count the PNGs actually written to the frames directory.
fn count_frames(frames_dir: &Path) -> MediaResult<u64> {
    let mut count = 0;
    for entry in std::fs::read_dir(frames_dir)? {
        let entry = entry?;
        if entry.path().extension().is_some_and(|ext| ext == "png") {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> EncoderOptions {
        EncoderOptions::default()
    }

    #[test]
    fn test_filter_merges_mask_luminance() {
        let filter = alpha_merge_filter(None);
        assert!(filter.contains("format=gray"));
        assert!(filter.contains("alphamerge"));
        assert!(filter.starts_with("[1:v]"));
    }

    #[test]
    fn test_filter_with_resolution_scales_output() {
        let filter = alpha_merge_filter(Some(Resolution::new(1280, 720)));
        assert!(filter.contains("scale=1280:720"));
    }

    #[test]
    fn test_png_args() {
        let args = png_sequence_args(
            Path::new("/job/source.mp4"),
            Path::new("/job/mask.webm"),
            Path::new("/job/frames"),
            &opts(),
        );
        assert!(args.contains(&"rgba".to_string()));
        assert!(args.contains(&"-an".to_string()));
        assert!(args.last().unwrap().ends_with("frame_%06d.png"));
        // mask is the second input
        let mask_pos = args.iter().position(|a| a == "/job/mask.webm").unwrap();
        let source_pos = args.iter().position(|a| a == "/job/source.mp4").unwrap();
        assert!(source_pos < mask_pos);
    }

    #[test]
    fn test_prores_args() {
        let args = prores_args(
            Path::new("/job/source.mp4"),
            Path::new("/job/mask.webm"),
            Path::new("/job/hero.mov"),
            &opts(),
        );
        assert!(args.contains(&"prores_ks".to_string()));
        assert!(args.contains(&"4444".to_string()));
        assert!(args.contains(&"yuva444p10le".to_string()));
        assert!(args.last().unwrap().ends_with(".mov"));
    }

    #[test]
    fn test_webm_args() {
        let args = webm_args(
            Path::new("/job/source.mp4"),
            Path::new("/job/mask.webm"),
            Path::new("/job/hero.webm"),
            &opts(),
        );
        assert!(args.contains(&"libvpx-vp9".to_string()));
        assert!(args.contains(&"yuva420p".to_string()));
        assert!(args.contains(&WEBM_BITRATE.to_string()));
        assert!(args.contains(&"-auto-alt-ref".to_string()));
        assert!(args.last().unwrap().ends_with(".webm"));
    }

    #[test]
    fn test_frame_rate_override_adds_rate_arg() {
        let options = EncoderOptions {
            frame_rate: Some(24.0),
            resolution: None,
        };
        let args = base_args(
            Path::new("/job/source.mp4"),
            Path::new("/job/mask.webm"),
            &options,
        );
        let pos = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[pos + 1], "24");
    }

    #[test]
    fn test_count_frames_only_counts_pngs() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            std::fs::write(dir.path().join(format!("frame_{i:06}.png")), b"png").unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        assert_eq!(count_frames(dir.path()).unwrap(), 3);
    }
}
