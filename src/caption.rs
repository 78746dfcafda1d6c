//! Caption compositor.
//!
//! A scene's narration is rasterized once into a full-canvas overlay that the assembler lays
//! over every frame of the scene. Caption failures never reach the caller: the scene is emitted
//! without a caption instead.

use std::sync::Arc;

use crate::clip::VisualClip;
use crate::config::{CaptionConfig, RenderConfig};
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::foundation::math::truncate_chars;
use crate::render::frame::PremulLayer;
use crate::text::{FontChoice, TextBacking, TextBlock, TextEngine, TextStyle};

/// Anything that can turn caption text into an overlay.
pub trait CaptionRenderer: Send + Sync {
    /// Rasterize `text` onto a transparent layer of `canvas` size.
    fn render(&self, text: &str, canvas: Canvas) -> NewsreelResult<PremulLayer>;
}

/// Caption look in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionStyle {
    /// Resolved font family.
    pub family: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Wrap width in pixels.
    pub max_width: f32,
    /// Top of the caption block as a fraction of canvas height.
    pub anchor_y: f32,
    /// Outline width in pixels.
    pub stroke_width: f32,
    /// Baseline distance as a multiple of `font_size`.
    pub line_spacing: f32,
    /// Backing band opacity; 0 disables the band.
    pub band_opacity: f32,
    /// Text is cut to this many characters.
    pub max_chars: usize,
}

impl CaptionStyle {
    /// Scale `cfg` by `px_scale` for the resolved `family`.
    pub fn from_config(cfg: &CaptionConfig, family: impl Into<String>, px_scale: f32) -> Self {
        Self {
            family: family.into(),
            font_size: cfg.font_size * px_scale,
            max_width: cfg.max_width * px_scale,
            anchor_y: cfg.anchor_y,
            stroke_width: cfg.stroke_width * px_scale,
            line_spacing: cfg.line_spacing,
            band_opacity: cfg.band_opacity,
            max_chars: cfg.max_chars,
        }
    }
}

/// White, black-outlined captions rasterized through `resvg`.
#[derive(Clone, Debug)]
pub struct SvgCaptionRenderer {
    engine: TextEngine,
    style: CaptionStyle,
}

impl SvgCaptionRenderer {
    /// Renderer drawing with `style`.
    pub fn new(engine: TextEngine, style: CaptionStyle) -> Self {
        Self { engine, style }
    }

    /// Renderer for `cfg`, or `None` when captions are disabled or no configured family is
    /// installed.
    pub fn from_config(cfg: &RenderConfig, engine: &TextEngine) -> Option<Self> {
        if !cfg.caption.enabled {
            tracing::info!("captions disabled by configuration");
            return None;
        }
        match engine.resolve(&cfg.caption.font_families) {
            FontChoice::Vector { family } => {
                tracing::debug!(family = %family, "caption font resolved");
                let style = CaptionStyle::from_config(&cfg.caption, family, cfg.px_scale());
                Some(Self::new(engine.clone(), style))
            }
            FontChoice::Bitmap => {
                tracing::warn!(
                    families = ?cfg.caption.font_families,
                    "no caption font family installed, captions disabled"
                );
                None
            }
        }
    }

    /// Caption look this renderer uses.
    pub fn style(&self) -> &CaptionStyle {
        &self.style
    }

    /// Lay out `text` into a caption block for `canvas`.
    pub fn layout(&self, text: &str, canvas: Canvas) -> NewsreelResult<TextBlock> {
        let s = &self.style;
        let text_style = TextStyle {
            family: s.family.clone(),
            size_px: s.font_size,
            fill: Rgb8::WHITE,
            stroke: (s.stroke_width > 0.0).then_some((Rgb8::BLACK, s.stroke_width)),
        };
        let lines = self.engine.wrap(&text_style, text, s.max_width)?;
        let mut widest = 0.0f32;
        for line in &lines {
            widest = widest.max(self.engine.measure(&text_style, line)?);
        }

        let line_height = s.font_size * s.line_spacing;
        let padding = s.font_size * 0.3;
        let block_h = lines.len() as f32 * line_height;
        let h = canvas.height as f32;
        let top_y = (s.anchor_y * h).min(h - block_h - padding).max(padding);

        Ok(TextBlock {
            lines,
            style: text_style,
            center_x: canvas.width as f32 / 2.0,
            top_y,
            line_height,
            backing: (s.band_opacity > 0.0).then_some(TextBacking {
                color: Rgb8::BLACK,
                opacity: s.band_opacity,
                padding,
                width: widest,
            }),
        })
    }
}

impl CaptionRenderer for SvgCaptionRenderer {
    fn render(&self, text: &str, canvas: Canvas) -> NewsreelResult<PremulLayer> {
        let text = truncate_chars(text.trim(), self.style.max_chars);
        let block = self.layout(text, canvas)?;
        let layer = self.engine.rasterize(canvas, &[block])?;
        if !layer.has_coverage() {
            return Err(NewsreelError::text("caption rendered no pixels"));
        }
        Ok(layer)
    }
}

/// A visual clip with its optional caption overlay; lasts as long as the clip.
#[derive(Clone, Debug)]
pub struct Composite {
    /// Underlying clip.
    pub clip: VisualClip,
    /// Overlay laid over every frame, if the caption rendered.
    pub caption: Option<Arc<PremulLayer>>,
}

impl Composite {
    /// Clip with no caption.
    pub fn bare(clip: VisualClip) -> Self {
        Self {
            clip,
            caption: None,
        }
    }

    /// `true` when a caption overlay is attached.
    pub fn has_caption(&self) -> bool {
        self.caption.is_some()
    }

    /// Composite length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.clip.duration_secs
    }
}

/// Attach the caption for `narration` to `clip`.
///
/// Blank narration, a missing renderer, or any rendering error yields the bare clip.
pub fn composite_scene(
    clip: VisualClip,
    narration: &str,
    renderer: Option<&dyn CaptionRenderer>,
) -> Composite {
    let Some(renderer) = renderer else {
        return Composite::bare(clip);
    };
    if narration.trim().is_empty() {
        return Composite::bare(clip);
    }

    match renderer.render(narration, clip.canvas) {
        Ok(layer) if layer.width == clip.canvas.width && layer.height == clip.canvas.height => {
            Composite {
                clip,
                caption: Some(Arc::new(layer)),
            }
        }
        Ok(layer) => {
            tracing::warn!(
                scene = clip.scene_number,
                width = layer.width,
                height = layer.height,
                "caption layer size does not match the clip, dropping caption"
            );
            Composite::bare(clip)
        }
        Err(e) => {
            tracing::warn!(scene = clip.scene_number, error = %e, "caption failed, using bare clip");
            Composite::bare(clip)
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/caption.rs"]
mod tests;
