use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::render::frame::FrameRGBA;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
///
/// The narration track, when given in `SinkConfig.audio`, is muxed as the second input. If the
/// sink is aborted or dropped before `end` succeeds, the child is killed and the partial output
/// file removed.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    frame_len: usize,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            frame_len: 0,
            cfg: None,
            last_idx: None,
        }
    }

    /// Output path this sink writes.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn remove_partial_output(&self) {
        match std::fs::remove_file(&self.opts.out_path) {
            Ok(()) => {
                tracing::debug!(path = %self.opts.out_path.display(), "removed partial output");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.opts.out_path.display(), error = %e, "failed to remove partial output");
            }
        }
    }

    fn join_stderr(&mut self) -> NewsreelResult<Vec<u8>> {
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| NewsreelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| NewsreelError::encode(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

pub(crate) fn ffmpeg_args(cfg: &SinkConfig, out_path: &Path, overwrite: bool) -> Vec<String> {
    let mut args: Vec<String> = vec![if overwrite { "-y" } else { "-n" }.into()];

    // Input 0: raw opaque RGBA8 frames on stdin.
    args.extend([
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgba".into(),
        "-s".into(),
        format!("{}x{}", cfg.width, cfg.height),
    ]);
    push_input_fps(&mut args, cfg.fps);
    args.extend(["-i".into(), "pipe:0".into()]);

    if let Some(audio) = cfg.audio.as_ref() {
        args.extend(["-i".into(), audio.to_string_lossy().into_owned()]);
        args.extend(
            [
                "-map", "0:v:0", "-map", "1:a:0", "-c:v", "libx264", "-pix_fmt", "yuv420p",
                "-c:a", "aac", "-shortest", "-movflags", "+faststart",
            ]
            .map(String::from),
        );
    } else {
        args.extend(
            [
                "-an", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart",
            ]
            .map(String::from),
        );
    }
    args.push(out_path.to_string_lossy().into_owned());
    args
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> NewsreelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(NewsreelError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(NewsreelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(NewsreelError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && !audio.is_file()
        {
            return Err(NewsreelError::encode(format!(
                "narration track '{}' does not exist",
                audio.display()
            )));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(NewsreelError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(NewsreelError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(ffmpeg_args(&cfg, &self.opts.out_path, self.opts.overwrite))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                NewsreelError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| NewsreelError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| NewsreelError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            audio = cfg.audio.is_some(),
            "ffmpeg encoder started"
        );
        self.frame_len = cfg.width as usize * cfg.height as usize * 4;
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NewsreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| NewsreelError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(NewsreelError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(NewsreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.frame_len {
            return Err(NewsreelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(NewsreelError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            NewsreelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> NewsreelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| NewsreelError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            NewsreelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        });
        let stderr_bytes = self.join_stderr();
        self.cfg = None;

        let status = match status {
            Ok(s) => s,
            Err(e) => {
                self.remove_partial_output();
                return Err(e);
            }
        };
        if !status.success() {
            self.remove_partial_output();
            let stderr_bytes = stderr_bytes.unwrap_or_default();
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(NewsreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        stderr_bytes?;
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            let _ = self.join_stderr();
            self.remove_partial_output();
            tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg encoder aborted");
        }
        self.cfg = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.abort();
    }
}

fn push_input_fps(args: &mut Vec<String>, fps: Fps) {
    // For rawvideo input, use `-r` before `-i` to specify the input framerate.
    args.extend(["-r".into(), format!("{}/{}", fps.num, fps.den)]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> NewsreelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
