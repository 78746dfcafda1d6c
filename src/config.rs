//! Render configuration.
//!
//! Every field has a default, so an empty JSON object is a complete configuration. Sizes in
//! [`CaptionConfig`] and [`PlaceholderConfig`] are given for a 720-pixel-high canvas and scale
//! with the configured canvas height.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Fps, Rgb8};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::timing::AllocationPolicy;

/// Canvas height the pixel sizes in this module are expressed for.
pub const REFERENCE_HEIGHT: f32 = 720.0;

/// Top-level configuration for a [`crate::pipeline::Renderer`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output resolution.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Directory under which per-request scratch directories are created.
    pub temp_root: PathBuf,
    /// Keep the per-request scratch directory after rendering.
    pub keep_temp: bool,
    /// Build scene composites on the rayon pool.
    pub parallel_scenes: bool,
    /// Narration time distribution across scenes.
    pub allocation: AllocationPolicy,
    /// Letterbox color behind media that does not fill the canvas.
    pub background: Rgb8,
    /// Caption overlay settings.
    pub caption: CaptionConfig,
    /// Placeholder clip settings.
    pub placeholder: PlaceholderConfig,
    /// Voice synthesizer command.
    pub voice: CommandTemplate,
    /// External collaborator commands.
    pub providers: ProvidersConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::HD_720,
            fps: Fps::OUTPUT,
            temp_root: std::env::temp_dir().join("newsreel"),
            keep_temp: false,
            parallel_scenes: true,
            allocation: AllocationPolicy::Equal,
            background: Rgb8::BLACK,
            caption: CaptionConfig::default(),
            placeholder: PlaceholderConfig::default(),
            voice: CommandTemplate {
                program: "espeak-ng".to_string(),
                args: vec!["-w".to_string(), "{out}".to_string(), "{text}".to_string()],
                extension: "wav".to_string(),
            },
            providers: ProvidersConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Load a JSON config file.
    pub fn load(path: &Path) -> NewsreelResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&json).map_err(|e| {
            NewsreelError::serde(format!("invalid config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    pub fn validate(&self) -> NewsreelResult<()> {
        self.canvas.validate()?;
        Fps::new(self.fps.num, self.fps.den)?;
        let c = &self.caption;
        if !(c.font_size > 0.0 && c.max_width > 0.0 && c.line_spacing > 0.0) {
            return Err(NewsreelError::validation(
                "caption font_size, max_width and line_spacing must be > 0",
            ));
        }
        if !(0.0..=1.0).contains(&c.anchor_y) {
            return Err(NewsreelError::validation("caption anchor_y must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&c.band_opacity) {
            return Err(NewsreelError::validation(
                "caption band_opacity must be in [0, 1]",
            ));
        }
        if !(self.placeholder.font_size > 0.0 && self.placeholder.max_width > 0.0) {
            return Err(NewsreelError::validation(
                "placeholder font_size and max_width must be > 0",
            ));
        }
        Ok(())
    }

    /// Scale factor from reference pixel sizes to this canvas.
    pub fn px_scale(&self) -> f32 {
        self.canvas.height as f32 / REFERENCE_HEIGHT
    }
}

/// Caption overlay settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Disable to render every scene without captions.
    pub enabled: bool,
    /// Family preference list; the first one installed wins.
    pub font_families: Vec<String>,
    /// Extra font files loaded at startup.
    pub font_files: Vec<PathBuf>,
    /// Font size in reference pixels.
    pub font_size: f32,
    /// Wrap width in reference pixels.
    pub max_width: f32,
    /// Top of the caption block as a fraction of canvas height.
    pub anchor_y: f32,
    /// Outline width in reference pixels.
    pub stroke_width: f32,
    /// Caption text is cut to this many characters.
    pub max_chars: usize,
    /// Baseline distance as a multiple of `font_size`.
    pub line_spacing: f32,
    /// Opacity of the dark band behind the caption; 0 disables it.
    pub band_opacity: f32,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_families: default_font_families(),
            font_files: Vec::new(),
            font_size: 40.0,
            max_width: 1100.0,
            anchor_y: 0.8,
            stroke_width: 2.0,
            max_chars: 100,
            line_spacing: 1.2,
            band_opacity: 0.35,
        }
    }
}

/// Placeholder clip settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// Family preference list for placeholder and fallback-image text.
    pub font_families: Vec<String>,
    /// Font size in reference pixels.
    pub font_size: f32,
    /// Wrap width in reference pixels.
    pub max_width: f32,
    /// Text is cut to this many characters.
    pub max_chars: usize,
    /// Flat background color.
    pub background: Rgb8,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            font_families: default_font_families(),
            font_size: 50.0,
            max_width: 1100.0,
            max_chars: 100,
            background: Rgb8(30, 30, 50),
        }
    }
}

fn default_font_families() -> Vec<String> {
    ["Times New Roman", "DejaVu Serif", "Liberation Serif", "serif"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// External program invocation with `{placeholder}` argument substitution.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CommandTemplate {
    /// Executable name or path.
    pub program: String,
    /// Arguments; `{text}` and `{out}` are substituted where supported.
    pub args: Vec<String>,
    /// Extension of the file the command writes, when it writes one.
    pub extension: String,
}

impl CommandTemplate {
    /// Arguments with every `{key}` replaced by its value.
    pub fn render_args(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("{{{key}}}"), value)
                })
            })
            .collect()
    }
}

/// Commands standing in for the script, enrichment and media services.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Reads an article on stdin, writes a script document on stdout.
    pub script: Option<CommandTemplate>,
    /// Reads a scene on stdin, writes `{keywords, media_type, mood}` on stdout.
    pub enrich: Option<CommandTemplate>,
    /// Reads enriched scenes on stdin, writes media candidates on stdout.
    pub media: Option<CommandTemplate>,
}
