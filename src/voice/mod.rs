//! Voice synthesizer.
//!
//! Narration is produced by an external text-to-speech program into the request workspace; its
//! measured duration drives all scene timing. Any failure here aborts the render.

use std::path::{Path, PathBuf};

use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::probe::probe_media;

/// Command-line synthesizers.
pub mod command;

pub use command::{CommandVoice, SilenceVoice};

/// Turns narration text into an audio file.
pub trait VoiceSynthesizer: Send + Sync {
    /// Write narration for `text` into `out_dir` and return the file path.
    fn synthesize(&self, text: &str, out_dir: &Path) -> NewsreelResult<PathBuf>;
}

/// A synthesized narration file and its measured length.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationTrack {
    /// Audio file inside the request workspace.
    pub path: PathBuf,
    /// Measured duration in seconds, always finite and > 0.
    pub duration_secs: f64,
}

/// Measured duration of the audio file at `path`.
pub fn probe_duration_secs(path: &Path) -> NewsreelResult<f64> {
    let info = probe_media(path).map_err(|e| NewsreelError::narration(e.to_string()))?;
    let d = info.duration_secs;
    if !d.is_finite() || d <= 0.0 {
        return Err(NewsreelError::narration(format!(
            "narration '{}' has no measurable duration ({d})",
            path.display()
        )));
    }
    Ok(d)
}

/// Synthesize `text` with `voice` and measure the result.
///
/// Every failure comes back as [`NewsreelError::Narration`].
pub fn narrate(
    voice: &dyn VoiceSynthesizer,
    text: &str,
    out_dir: &Path,
) -> NewsreelResult<NarrationTrack> {
    if text.trim().is_empty() {
        return Err(NewsreelError::narration("script text is empty"));
    }
    let path = voice.synthesize(text, out_dir).map_err(as_narration)?;
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        return Err(NewsreelError::narration(format!(
            "synthesizer produced no audio at '{}'",
            path.display()
        )));
    }
    let duration_secs = probe_duration_secs(&path)?;
    tracing::info!(path = %path.display(), duration_secs, "narration synthesized");
    Ok(NarrationTrack {
        path,
        duration_secs,
    })
}

fn as_narration(e: NewsreelError) -> NewsreelError {
    match e {
        NewsreelError::Narration(_) => e,
        other => NewsreelError::narration(other.to_string()),
    }
}
