//! `ffprobe` wrappers for media inspection.

use std::path::Path;

use crate::foundation::error::{NewsreelError, NewsreelResult};

/// Stream and container facts reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    /// Width of the first video stream, if any.
    pub width: Option<u32>,
    /// Height of the first video stream, if any.
    pub height: Option<u32>,
    /// Frame rate of the first video stream as `(num, den)`.
    pub frame_rate: Option<(u32, u32)>,
    /// Container duration in seconds; 0 when unknown.
    pub duration_secs: f64,
    /// Container has at least one audio stream.
    pub has_audio: bool,
}

impl MediaInfo {
    /// `(width, height)` of the video stream when both are known and non-zero.
    pub fn video_size(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}

/// Run `ffprobe` on `path`. Failures are reported as media errors.
pub fn probe_media(path: &Path) -> NewsreelResult<MediaInfo> {
    if !is_ffprobe_on_path() {
        return Err(NewsreelError::media(
            "ffprobe is required for media inspection, but was not found on PATH",
        ));
    }
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| NewsreelError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(NewsreelError::media(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(&out.stdout)
        .map_err(|e| NewsreelError::media(format!("'{}': {e}", path.display())))
}

pub(crate) fn parse_probe_json(json: &[u8]) -> Result<MediaInfo, String> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut =
        serde_json::from_slice(json).map_err(|e| format!("ffprobe json parse failed: {e}"))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let stream_duration = parsed
        .streams
        .iter()
        .filter_map(|s| s.duration.as_deref()?.parse::<f64>().ok())
        .fold(0.0f64, f64::max);
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(stream_duration);

    Ok(MediaInfo {
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
        frame_rate: video
            .and_then(|s| s.r_frame_rate.as_deref())
            .and_then(parse_ff_ratio),
        duration_secs,
        has_audio: parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio")),
    })
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
