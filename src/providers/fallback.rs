use std::path::Path;

use anyhow::Context as _;

use crate::config::RenderConfig;
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::providers::MediaProvider;
use crate::render::frame::FrameRGBA;
use crate::script::model::{MediaFile, MediaKind, Scene, media_for_scene};
use crate::text::{FontChoice, TextBlock, TextEngine, TextStyle, bitmap};

/// Gradient endpoints, top to bottom, cycled by scene index.
pub const GRADIENTS: [(Rgb8, Rgb8); 4] = [
    (Rgb8(41, 128, 185), Rgb8(142, 68, 173)),
    (Rgb8(52, 152, 219), Rgb8(46, 204, 113)),
    (Rgb8(155, 89, 182), Rgb8(52, 73, 94)),
    (Rgb8(230, 126, 34), Rgb8(231, 76, 60)),
];

/// JPEG quality of generated images.
pub const JPEG_QUALITY: u8 = 85;

// Layout in 720p reference pixels.
const TITLE_TOP: f32 = 100.0;
const TITLE_SIZE: f32 = 60.0;
const BODY_TOP: f32 = 300.0;
const BODY_SIZE: f32 = 40.0;
const BODY_STEP: f32 = 60.0;
const BODY_WIDTH: f32 = 1100.0;
const BODY_MAX_LINES: usize = 3;

/// Generates a titled gradient image per scene when no real media is available.
#[derive(Clone, Debug)]
pub struct FallbackMediaProvider {
    canvas: Canvas,
    px_scale: f32,
    font: FontChoice,
    text: TextEngine,
}

impl FallbackMediaProvider {
    /// Provider drawing on `canvas`, with text in `font` (bitmap when no family resolved).
    pub fn new(canvas: Canvas, font: FontChoice, text: TextEngine) -> Self {
        Self {
            canvas,
            px_scale: canvas.height as f32 / crate::config::REFERENCE_HEIGHT,
            font,
            text,
        }
    }

    /// Provider using the placeholder font preferences of `cfg`.
    pub fn from_config(cfg: &RenderConfig, text: TextEngine) -> Self {
        let font = text.resolve(&cfg.placeholder.font_families);
        Self::new(cfg.canvas, font, text)
    }

    /// Image for the scene at 0-based position `idx` with `description` as body text.
    pub fn render(&self, idx: usize, description: &str) -> FrameRGBA {
        let (top, bottom) = GRADIENTS[idx % GRADIENTS.len()];
        let mut frame = FrameRGBA::filled(self.canvas, top);
        let (w, h) = (self.canvas.width as usize, self.canvas.height as usize);
        for (y, row) in frame.data.chunks_exact_mut(w * 4).enumerate() {
            let rgba = top.lerp(bottom, y as f64 / h as f64).to_rgba();
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }

        let title = format!("Scene {}", idx + 1);
        if let Some(family) = self.font.family() {
            match self.draw_vector(&mut frame, family, &title, description) {
                Ok(()) => return frame,
                Err(e) => {
                    tracing::warn!(family, error = %e, "fallback image text failed, using bitmap font");
                }
            }
        }
        self.draw_bitmap(&mut frame, &title, description);
        frame
    }

    fn draw_vector(
        &self,
        frame: &mut FrameRGBA,
        family: &str,
        title: &str,
        description: &str,
    ) -> NewsreelResult<()> {
        let s = self.px_scale;
        let style = |size: f32| TextStyle {
            family: family.to_string(),
            size_px: size * s,
            fill: Rgb8::WHITE,
            stroke: None,
        };
        let title_style = style(TITLE_SIZE);
        self.text.measure(&title_style, title)?;
        let body_style = style(BODY_SIZE);
        let mut body = self.text.wrap(&body_style, description, BODY_WIDTH * s)?;
        body.truncate(BODY_MAX_LINES);

        let center_x = self.canvas.width as f32 / 2.0;
        let blocks = [
            TextBlock {
                lines: vec![title.to_string()],
                style: title_style,
                center_x,
                top_y: TITLE_TOP * s,
                line_height: TITLE_SIZE * s,
                backing: None,
            },
            TextBlock {
                lines: body,
                style: body_style,
                center_x,
                top_y: BODY_TOP * s,
                line_height: BODY_STEP * s,
                backing: None,
            },
        ];
        let layer = self.text.rasterize(self.canvas, &blocks)?;
        frame.composite(&layer)
    }

    fn draw_bitmap(&self, frame: &mut FrameRGBA, title: &str, description: &str) {
        let s = self.px_scale;
        let center = |frame: &FrameRGBA, line: &str, scale: u32| {
            (i64::from(frame.width) - i64::from(bitmap::line_width_px(line, scale))) / 2
        };

        let title_scale = bitmap::scale_for_size(TITLE_SIZE * s);
        let x = center(frame, title, title_scale);
        bitmap::draw_line(frame, title, x, (TITLE_TOP * s) as i64, title_scale, Rgb8::WHITE);

        let body_scale = bitmap::scale_for_size(BODY_SIZE * s);
        let lines = bitmap::wrap(description, body_scale, (BODY_WIDTH * s) as u32);
        for (i, line) in lines.iter().take(BODY_MAX_LINES).enumerate() {
            let x = center(frame, line, body_scale);
            let y = ((BODY_TOP + i as f32 * BODY_STEP) * s) as i64;
            bitmap::draw_line(frame, line, x, y, body_scale, Rgb8::WHITE);
        }
    }

    /// Render and save the image for `scene` at position `idx` into `out_dir`.
    pub fn write_for_scene(&self, idx: usize, scene: &Scene, out_dir: &Path) -> NewsreelResult<MediaFile> {
        let description = if scene.visual_description.trim().is_empty() {
            format!("Scene {}", idx + 1)
        } else {
            scene.visual_description.clone()
        };
        let frame = self.render(idx, &description);
        let path = out_dir.join(format!("fallback_scene_{idx}.jpg"));
        write_jpeg(&frame, &path)?;
        tracing::debug!(scene = scene.scene_number, path = %path.display(), "fallback image written");
        Ok(MediaFile {
            scene_number: scene.scene_number,
            path,
            kind: MediaKind::Image,
        })
    }
}

/// Encode `frame` as a JPEG at [`JPEG_QUALITY`].
pub fn write_jpeg(frame: &FrameRGBA, path: &Path) -> NewsreelResult<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("create image '{}'", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    frame
        .to_rgb_image()
        .write_with_encoder(encoder)
        .map_err(|e| NewsreelError::media(format!("failed to encode '{}': {e}", path.display())))?;
    use std::io::Write as _;
    writer
        .flush()
        .with_context(|| format!("flush image '{}'", path.display()))?;
    Ok(())
}

impl MediaProvider for FallbackMediaProvider {
    fn fetch(&self, scenes: &[Scene], out_dir: &Path) -> NewsreelResult<Vec<MediaFile>> {
        scenes
            .iter()
            .enumerate()
            .map(|(idx, scene)| self.write_for_scene(idx, scene, out_dir))
            .collect()
    }
}

/// A primary provider backed by generated images.
///
/// When the primary fails outright every scene gets a generated image; otherwise only the
/// scenes it returned nothing for do. A scene whose image cannot be written is left without
/// media.
pub struct MediaWithFallback {
    primary: Box<dyn MediaProvider>,
    fallback: FallbackMediaProvider,
}

impl MediaWithFallback {
    /// Wrap `primary`.
    pub fn new(primary: Box<dyn MediaProvider>, fallback: FallbackMediaProvider) -> Self {
        Self { primary, fallback }
    }
}

impl MediaProvider for MediaWithFallback {
    fn fetch(&self, scenes: &[Scene], out_dir: &Path) -> NewsreelResult<Vec<MediaFile>> {
        let mut media = match self.primary.fetch(scenes, out_dir) {
            Ok(media) => media,
            Err(e) => {
                tracing::warn!(error = %e, "media provider failed, generating images for all scenes");
                Vec::new()
            }
        };

        let mut generated = 0usize;
        for (idx, scene) in scenes.iter().enumerate() {
            if media_for_scene(&media, scene.scene_number).is_some() {
                continue;
            }
            match self.fallback.write_for_scene(idx, scene, out_dir) {
                Ok(file) => {
                    generated += 1;
                    media.push(file);
                }
                Err(e) => {
                    tracing::warn!(
                        scene = scene.scene_number,
                        error = %e,
                        "fallback image failed, scene will use a placeholder"
                    );
                }
            }
        }
        if generated > 0 {
            tracing::info!(count = generated, "generated fallback images for scenes without media");
        }
        Ok(media)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/providers/fallback.rs"]
mod tests;
