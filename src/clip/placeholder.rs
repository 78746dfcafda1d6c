use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::NewsreelResult;
use crate::foundation::math::truncate_chars;
use crate::render::frame::FrameRGBA;
use crate::text::{FontChoice, TextBlock, TextEngine, TextStyle, bitmap};

/// Settings for one placeholder frame, with sizes already in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceholderStyle {
    /// Flat background.
    pub background: Rgb8,
    /// Text color.
    pub color: Rgb8,
    /// Font size in pixels.
    pub font_size: f32,
    /// Wrap width in pixels.
    pub max_width: f32,
    /// Text is cut to this many characters.
    pub max_chars: usize,
}

/// Solid frame with `text` centered on it.
///
/// The text uses `font` when it is a vector family and the built-in bitmap font otherwise, or
/// when vector layout fails. The background is drawn even if no text can be.
pub fn render_placeholder(
    canvas: Canvas,
    text: &str,
    style: &PlaceholderStyle,
    font: &FontChoice,
    engine: &TextEngine,
) -> FrameRGBA {
    let mut frame = FrameRGBA::filled(canvas, style.background);
    let text = truncate_chars(text.trim(), style.max_chars);
    if text.is_empty() {
        return frame;
    }

    if let Some(family) = font.family() {
        match draw_vector(&mut frame, text, family, style, engine) {
            Ok(()) => return frame,
            Err(e) => {
                tracing::warn!(family, error = %e, "vector placeholder text failed, using bitmap font");
            }
        }
    }
    draw_bitmap(&mut frame, text, style);
    frame
}

fn draw_vector(
    frame: &mut FrameRGBA,
    text: &str,
    family: &str,
    style: &PlaceholderStyle,
    engine: &TextEngine,
) -> NewsreelResult<()> {
    let text_style = TextStyle {
        family: family.to_string(),
        size_px: style.font_size,
        fill: style.color,
        stroke: None,
    };
    // Single words never reach the measuring step of `wrap`; measure once so a family
    // with no usable glyphs is caught here.
    engine.measure(&text_style, text)?;
    let lines = engine.wrap(&text_style, text, style.max_width)?;
    let line_height = style.font_size * 1.2;
    let canvas = frame.canvas();
    let block_h = lines.len() as f32 * line_height;
    let block = TextBlock {
        lines,
        style: text_style,
        center_x: canvas.width as f32 / 2.0,
        top_y: (canvas.height as f32 - block_h) / 2.0,
        line_height,
        backing: None,
    };
    let layer = engine.rasterize(canvas, &[block])?;
    frame.composite(&layer)
}

fn draw_bitmap(frame: &mut FrameRGBA, text: &str, style: &PlaceholderStyle) {
    let scale = bitmap::scale_for_size(style.font_size);
    let lines = bitmap::wrap(text, scale, style.max_width.max(1.0) as u32);
    let center_y = i64::from(frame.height / 2);
    bitmap::draw_centered(frame, &lines, scale, style.color, center_y);
}
