//! Scene timing: split the narration length across scenes and map it onto output frames.

use crate::foundation::core::{FrameIndex, FrameRange, Fps};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::script::model::Scene;

/// Scene length used when there are no scenes to divide the narration over.
pub const FALLBACK_SCENE_SECS: f64 = 5.0;

/// How narration time is distributed across scenes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationPolicy {
    /// Every scene gets `total / n`.
    #[default]
    Equal,
    /// Scenes get time in proportion to their narration word count.
    Words,
}

/// Equal share of `total_secs` for each of `num_scenes` scenes.
///
/// Returns [`FALLBACK_SCENE_SECS`] when there are no scenes.
pub fn duration_per_scene(total_secs: f64, num_scenes: usize) -> f64 {
    if num_scenes == 0 {
        return FALLBACK_SCENE_SECS;
    }
    total_secs / num_scenes as f64
}

/// Per-scene durations for `scenes`, in scene order. The durations sum to `total_secs`.
pub fn allocate(total_secs: f64, scenes: &[Scene], policy: AllocationPolicy) -> Vec<f64> {
    let n = scenes.len();
    let equal = || vec![duration_per_scene(total_secs, n); n];

    match policy {
        AllocationPolicy::Equal => equal(),
        AllocationPolicy::Words => {
            let words: Vec<usize> = scenes
                .iter()
                .map(|s| s.narration.split_whitespace().count())
                .collect();
            let total_words: usize = words.iter().sum();
            if total_words == 0 {
                return equal();
            }
            words
                .iter()
                .map(|&w| total_secs * (w as f64) / (total_words as f64))
                .collect()
        }
    }
}

/// Contiguous frame spans for consecutive scene durations.
///
/// Boundaries are rounded from the cumulative time, so per-scene rounding never accumulates:
/// the last span always ends at `round(sum(durations) * fps)`.
pub fn scene_frame_spans(durations: &[f64], fps: Fps) -> NewsreelResult<Vec<FrameRange>> {
    let mut spans = Vec::with_capacity(durations.len());
    let mut elapsed = 0.0f64;
    let mut start = 0u64;
    for &d in durations {
        if !d.is_finite() || d < 0.0 {
            return Err(NewsreelError::validation(format!(
                "scene duration must be finite and >= 0, got {d}"
            )));
        }
        elapsed += d;
        let end = fps.secs_to_frames_round(elapsed).max(start);
        spans.push(FrameRange::new(FrameIndex(start), FrameIndex(end))?);
        start = end;
    }
    Ok(spans)
}

#[cfg(test)]
#[path = "../tests/unit/timing.rs"]
mod tests;
