use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::CommandTemplate;
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::voice::VoiceSynthesizer;

/// Runs a text-to-speech program described by a [`CommandTemplate`].
///
/// `{out}` in the arguments is replaced by the output file path and `{text}` by the narration.
/// When no argument mentions `{text}`, the narration is written to the program's stdin.
#[derive(Clone, Debug)]
pub struct CommandVoice {
    template: CommandTemplate,
}

impl CommandVoice {
    /// Synthesizer running `template`.
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }

    fn output_path(&self, out_dir: &Path) -> PathBuf {
        let ext = self.template.extension.trim_start_matches('.');
        let ext = if ext.is_empty() { "wav" } else { ext };
        out_dir.join(format!("narration.{ext}"))
    }
}

impl VoiceSynthesizer for CommandVoice {
    fn synthesize(&self, text: &str, out_dir: &Path) -> NewsreelResult<PathBuf> {
        if self.template.program.trim().is_empty() {
            return Err(NewsreelError::narration("voice command is not configured"));
        }
        let out = self.output_path(out_dir);
        let out_str = out.to_string_lossy();
        let args = self
            .template
            .render_args(&[("out", out_str.as_ref()), ("text", text)]);
        let text_on_stdin = !self.template.args.iter().any(|a| a.contains("{text}"));

        tracing::debug!(program = %self.template.program, out = %out.display(), "running voice command");
        let mut child = Command::new(&self.template.program)
            .args(&args)
            .stdin(if text_on_stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                NewsreelError::narration(format!(
                    "failed to spawn voice command '{}': {e}",
                    self.template.program
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).map_err(|e| {
                NewsreelError::narration(format!("failed to write narration to voice command: {e}"))
            })?;
        }
        let output = child.wait_with_output().map_err(|e| {
            NewsreelError::narration(format!("failed to wait for voice command: {e}"))
        })?;
        if !output.status.success() {
            return Err(NewsreelError::narration(format!(
                "voice command exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if !out.is_file() {
            return Err(NewsreelError::narration(format!(
                "voice command did not write '{}'",
                out.display()
            )));
        }
        Ok(out)
    }
}

/// Silent narration of a fixed length, generated with `ffmpeg`'s `anullsrc`.
///
/// Lets the whole pipeline run without a speech engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SilenceVoice {
    /// Track length in seconds.
    pub duration_secs: f64,
}

impl SilenceVoice {
    /// Silent track of `duration_secs`.
    pub fn new(duration_secs: f64) -> Self {
        Self { duration_secs }
    }
}

pub(crate) fn silence_args(duration_secs: f64, out: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-v".into(),
        "error".into(),
        "-f".into(),
        "lavfi".into(),
        "-i".into(),
        "anullsrc=r=44100:cl=mono".into(),
        "-t".into(),
        format!("{duration_secs:.6}"),
        "-c:a".into(),
        "pcm_s16le".into(),
        out.to_string_lossy().into_owned(),
    ]
}

impl VoiceSynthesizer for SilenceVoice {
    fn synthesize(&self, _text: &str, out_dir: &Path) -> NewsreelResult<PathBuf> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(NewsreelError::narration(format!(
                "silence duration must be > 0, got {}",
                self.duration_secs
            )));
        }
        let out = out_dir.join("narration.wav");
        let output = Command::new("ffmpeg")
            .args(silence_args(self.duration_secs, &out))
            .output()
            .map_err(|e| NewsreelError::narration(format!("failed to run ffmpeg: {e}")))?;
        if !output.status.success() {
            return Err(NewsreelError::narration(format!(
                "ffmpeg silence generation failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_template_extension() {
        let voice = CommandVoice::new(CommandTemplate {
            program: "say".to_string(),
            args: vec!["-o".to_string(), "{out}".to_string()],
            extension: ".aiff".to_string(),
        });
        assert_eq!(
            voice.output_path(Path::new("/w")),
            PathBuf::from("/w/narration.aiff")
        );
    }

    #[test]
    fn unconfigured_or_missing_program_is_a_narration_error() {
        let dir = std::env::temp_dir();
        let empty = CommandVoice::new(CommandTemplate::default());
        assert!(matches!(
            empty.synthesize("hi", &dir),
            Err(NewsreelError::Narration(_))
        ));

        let missing = CommandVoice::new(CommandTemplate {
            program: "newsreel-no-such-tts-binary".to_string(),
            args: vec!["{out}".to_string()],
            extension: "wav".to_string(),
        });
        assert!(matches!(
            missing.synthesize("hi", &dir),
            Err(NewsreelError::Narration(_))
        ));
    }

    #[test]
    fn silence_rejects_non_positive_length() {
        let dir = std::env::temp_dir();
        assert!(SilenceVoice::new(0.0).synthesize("", &dir).is_err());
        assert!(SilenceVoice::new(f64::NAN).synthesize("", &dir).is_err());
    }

    #[test]
    fn silence_args_bound_the_length() {
        let args = silence_args(2.5, Path::new("/w/n.wav"));
        assert!(args.windows(2).any(|w| w == ["-t", "2.500000"]));
        assert_eq!(args.last().map(String::as_str), Some("/w/n.wav"));
    }
}
