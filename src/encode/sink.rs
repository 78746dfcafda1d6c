use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Narration track muxed under the video, if any.
    pub audio: Option<PathBuf>,
}

/// Sink contract for consuming assembled frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order. After a
/// failed `push_frame` the caller calls `abort` instead of `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> NewsreelResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NewsreelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> NewsreelResult<()>;
    /// Discard everything written so far. Must be safe to call in any state.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` succeeded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> NewsreelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NewsreelResult<()> {
        if self.cfg.is_none() {
            return Err(NewsreelError::encode("in-memory sink not started"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(NewsreelError::encode(
                "in-memory sink received out-of-order frame index",
            ));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> NewsreelResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.finished = false;
    }
}
