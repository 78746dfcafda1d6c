//! Sequence assembler.
//!
//! Scene composites are played back to back, in scene order, into a [`FrameSink`] together with
//! the narration track. Frames are produced on the calling thread and handed to a dedicated
//! encoder thread over a bounded channel. Any failure aborts the sink, so no partial output is
//! left behind.

use std::path::Path;
use std::sync::mpsc;

use crate::caption::Composite;
use crate::clip::ClipOrigin;
use crate::encode::{FfmpegSink, FfmpegSinkOpts, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::render::frame::FrameRGBA;

/// Frames buffered between the producer and the encoder thread.
const CHANNEL_CAPACITY: usize = 4;

/// Where one scene landed in the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneSegment {
    /// Scene number.
    pub scene_number: u32,
    /// Output frames covered by the scene.
    pub frames: FrameRange,
    /// How the scene's clip was built.
    pub origin: ClipOrigin,
    /// Whether a caption was laid over the scene.
    pub captioned: bool,
}

/// Summary of an assembled sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct AssemblyReport {
    /// Scenes in output order.
    pub segments: Vec<SceneSegment>,
    /// Frames written.
    pub total_frames: u64,
    /// Video length in seconds.
    pub duration_secs: f64,
}

/// Output format shared by every scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceFormat {
    /// Frame size.
    pub canvas: Canvas,
    /// Frame rate.
    pub fps: Fps,
}

/// Stream `composites` into `sink`, scene `i` covering `spans[i]`.
///
/// `spans` must be contiguous and start at frame 0. On error the sink is aborted.
pub fn assemble_sequence(
    composites: &[Composite],
    spans: &[FrameRange],
    format: SequenceFormat,
    audio: Option<&Path>,
    sink: &mut dyn FrameSink,
) -> NewsreelResult<AssemblyReport> {
    let total_frames = validate_layout(composites, spans, format)?;
    let cfg = SinkConfig {
        width: format.canvas.width,
        height: format.canvas.height,
        fps: format.fps,
        audio: audio.map(Path::to_path_buf),
    };

    let outcome = std::thread::scope(|scope| {
        let (tx, rx) = mpsc::sync_channel::<(FrameIndex, FrameRGBA)>(CHANNEL_CAPACITY);
        let sink_ref: &mut dyn FrameSink = &mut *sink;

        let enc = scope.spawn(move || -> NewsreelResult<()> {
            sink_ref.begin(cfg)?;
            let mut received = 0u64;
            while received < total_frames {
                let (idx, frame) = rx
                    .recv()
                    .map_err(|_| NewsreelError::encode("frame producer stopped early"))?;
                sink_ref.push_frame(idx, &frame)?;
                received += 1;
            }
            sink_ref.end()
        });

        let produced = produce_frames(composites, spans, format.canvas, &tx);
        drop(tx);
        let encoded = enc
            .join()
            .unwrap_or_else(|_| Err(NewsreelError::encode("encoder thread panicked")));
        (produced, encoded)
    });

    let failure = match outcome {
        (Err(e), _) => Some(e),
        (Ok(_), Err(e)) => Some(e),
        (Ok(false), Ok(())) => Some(NewsreelError::encode("encoder stopped accepting frames")),
        (Ok(true), Ok(())) => None,
    };
    if let Some(e) = failure {
        sink.abort();
        return Err(as_encode(e));
    }

    let segments = composites
        .iter()
        .zip(spans)
        .map(|(c, span)| SceneSegment {
            scene_number: c.clip.scene_number,
            frames: *span,
            origin: c.clip.origin(),
            captioned: c.has_caption(),
        })
        .collect();
    let report = AssemblyReport {
        segments,
        total_frames,
        duration_secs: format.fps.frames_to_secs(total_frames),
    };
    tracing::info!(
        scenes = report.segments.len(),
        frames = report.total_frames,
        duration_secs = report.duration_secs,
        "sequence assembled"
    );
    Ok(report)
}

/// Assemble into an MP4 at `out_path` with `audio` as the soundtrack.
pub fn render_to_file(
    composites: &[Composite],
    spans: &[FrameRange],
    format: SequenceFormat,
    audio: &Path,
    out_path: &Path,
) -> NewsreelResult<AssemblyReport> {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_path));
    assemble_sequence(composites, spans, format, Some(audio), &mut sink)
}

fn validate_layout(
    composites: &[Composite],
    spans: &[FrameRange],
    format: SequenceFormat,
) -> NewsreelResult<u64> {
    if composites.is_empty() {
        return Err(NewsreelError::encode("nothing to assemble"));
    }
    if composites.len() != spans.len() {
        return Err(NewsreelError::encode(format!(
            "{} composites but {} frame spans",
            composites.len(),
            spans.len()
        )));
    }
    let mut expected_start = 0u64;
    for (c, span) in composites.iter().zip(spans) {
        if span.start.0 != expected_start {
            return Err(NewsreelError::encode(format!(
                "scene {} starts at frame {}, expected {expected_start}",
                c.clip.scene_number, span.start.0
            )));
        }
        if c.clip.canvas != format.canvas {
            return Err(NewsreelError::encode(format!(
                "scene {} is {}x{}, output is {}x{}",
                c.clip.scene_number,
                c.clip.canvas.width,
                c.clip.canvas.height,
                format.canvas.width,
                format.canvas.height
            )));
        }
        expected_start = span.end.0;
    }
    if expected_start == 0 {
        return Err(NewsreelError::encode("sequence has no frames"));
    }
    Ok(expected_start)
}

/// Render every frame in order and send it. Returns `false` if the encoder hung up first.
fn produce_frames(
    composites: &[Composite],
    spans: &[FrameRange],
    canvas: Canvas,
    tx: &mpsc::SyncSender<(FrameIndex, FrameRGBA)>,
) -> NewsreelResult<bool> {
    for (composite, span) in composites.iter().zip(spans) {
        let scene = composite.clip.scene_number;
        tracing::debug!(scene, start = span.start.0, end = span.end.0, "assembling scene");
        let mut frames = composite
            .clip
            .open()
            .map_err(|e| NewsreelError::encode(format!("scene {scene}: {e}")))?;
        for idx in span.start.0..span.end.0 {
            let mut frame = FrameRGBA {
                width: canvas.width,
                height: canvas.height,
                data: vec![0u8; canvas.rgba_len()],
            };
            frames
                .next_into(&mut frame)
                .map_err(|e| NewsreelError::encode(format!("scene {scene}: {e}")))?;
            if let Some(caption) = composite.caption.as_deref() {
                frame.composite(caption)?;
            }
            if tx.send((FrameIndex(idx), frame)).is_err() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn as_encode(e: NewsreelError) -> NewsreelError {
    match e {
        NewsreelError::Encode(_) => e,
        other => NewsreelError::encode(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../tests/unit/assemble.rs"]
mod tests;
