//! Frame sinks: the in-memory sink used by tests and the `ffmpeg` MP4 sink.

/// MP4 output through the system `ffmpeg` binary.
pub mod ffmpeg;
/// Sink contract and the in-memory sink.
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use sink::{FrameSink, InMemorySink, SinkConfig};
