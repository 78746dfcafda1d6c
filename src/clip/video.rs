use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::foundation::core::{Canvas, Fps, Rgb8};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::probe::probe_media;
use crate::render::frame::FrameRGBA;

/// How a source video is fitted to the clip duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoFit {
    /// Source is shorter than the clip: repeat it from the start.
    Loop,
    /// Source is at least as long as the clip: keep its first seconds.
    Trim,
}

impl VideoFit {
    /// Fit for a source of `source_secs` filling `target_secs`.
    pub fn choose(source_secs: f64, target_secs: f64) -> Self {
        if source_secs < target_secs {
            Self::Loop
        } else {
            Self::Trim
        }
    }
}

/// Probed video source, ready to be streamed as clip frames.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoPlan {
    /// Source file.
    pub path: PathBuf,
    /// Source dimensions.
    pub source_size: (u32, u32),
    /// Source duration in seconds.
    pub source_secs: f64,
    /// Loop or trim.
    pub fit: VideoFit,
    /// Clip duration in seconds.
    pub duration_secs: f64,
}

/// Probe `path` and check that it decodes.
///
/// The source is scaled to the canvas height and center-cropped (or padded with `bg`) to the
/// canvas width when streamed.
pub fn plan_video(path: &Path, duration_secs: f64) -> NewsreelResult<VideoPlan> {
    let info = probe_media(path)?;
    let source_size = info.video_size().ok_or_else(|| {
        NewsreelError::media(format!("'{}' has no video stream", path.display()))
    })?;
    if info.duration_secs.is_nan() || info.duration_secs <= 0.0 {
        return Err(NewsreelError::media(format!(
            "'{}' reports no duration",
            path.display()
        )));
    }
    decode_first_frame(path)?;
    let fit = VideoFit::choose(info.duration_secs, duration_secs);
    tracing::debug!(
        path = %path.display(),
        source_secs = info.duration_secs,
        source_fps = ?info.frame_rate,
        ?fit,
        "video planned"
    );

    Ok(VideoPlan {
        path: path.to_path_buf(),
        source_size,
        source_secs: info.duration_secs,
        fit,
        duration_secs,
    })
}

fn decode_first_frame(path: &Path) -> NewsreelResult<()> {
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
        .output()
        .map_err(|e| NewsreelError::media(format!("failed to run ffmpeg for video decode: {e}")))?;
    if !out.status.success() || out.stdout.is_empty() {
        return Err(NewsreelError::media(format!(
            "ffmpeg could not decode '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

/// `-vf` filter chain that resamples to `fps` and fits the frame into `canvas`.
pub(crate) fn fit_filter(canvas: Canvas, fps: Fps, bg: Rgb8) -> String {
    let (w, h) = (canvas.width, canvas.height);
    format!(
        "fps={num}/{den},scale=-2:{h},crop='min(iw,{w})':{h},pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=0x{hex}",
        num = fps.num,
        den = fps.den,
        hex = bg.to_hex().trim_start_matches('#'),
    )
}

/// Decoder arguments for streaming `plan` as raw RGBA frames on stdout.
pub(crate) fn decoder_args(plan: &VideoPlan, canvas: Canvas, fps: Fps, bg: Rgb8) -> Vec<String> {
    let mut args: Vec<String> = vec!["-v".into(), "error".into()];
    if plan.fit == VideoFit::Loop {
        args.extend(["-stream_loop".into(), "-1".into()]);
    }
    args.extend(["-i".into(), plan.path.to_string_lossy().into_owned()]);
    args.extend([
        "-t".into(),
        format!("{:.6}", plan.duration_secs),
        "-vf".into(),
        fit_filter(canvas, fps, bg),
        "-an".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgba".into(),
        "pipe:1".into(),
    ]);
    args
}

/// Streaming decoder for one video clip.
///
/// When the decoder runs dry before the requested frame count, the last decoded frame repeats.
pub(crate) struct VideoFrames {
    child: Child,
    stdout: Option<ChildStdout>,
    path: PathBuf,
    last: Vec<u8>,
    have_frame: bool,
}

impl VideoFrames {
    pub(crate) fn spawn(plan: &VideoPlan, canvas: Canvas, fps: Fps, bg: Rgb8) -> NewsreelResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args(decoder_args(plan, canvas, fps, bg))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| NewsreelError::media(format!("failed to spawn ffmpeg decoder: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| NewsreelError::media("failed to open ffmpeg stdout (unexpected)"))?;
        Ok(Self {
            child,
            stdout: Some(stdout),
            path: plan.path.clone(),
            last: vec![0u8; canvas.rgba_len()],
            have_frame: false,
        })
    }

    /// Decode the next frame into `out`.
    pub(crate) fn next_into(&mut self, out: &mut FrameRGBA) -> NewsreelResult<()> {
        if out.data.len() != self.last.len() {
            return Err(NewsreelError::validation(
                "video frame buffer does not match the decoder output size",
            ));
        }
        if let Some(stdout) = self.stdout.as_mut() {
            match stdout.read_exact(&mut self.last) {
                Ok(()) => self.have_frame = true,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    tracing::debug!(path = %self.path.display(), "video decoder ran dry, holding last frame");
                    self.stdout = None;
                }
                Err(e) => {
                    return Err(NewsreelError::media(format!(
                        "failed to read decoded frames of '{}': {e}",
                        self.path.display()
                    )));
                }
            }
        }
        if !self.have_frame {
            return Err(NewsreelError::media(format!(
                "decoder produced no frames for '{}'",
                self.path.display()
            )));
        }
        out.data.copy_from_slice(&self.last);
        Ok(())
    }
}

impl Drop for VideoFrames {
    fn drop(&mut self) {
        drop(self.stdout.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
