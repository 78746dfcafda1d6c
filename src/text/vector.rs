use std::fmt::Write as _;

use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::render::frame::PremulLayer;
use crate::text::{TextEngine, wrap_words};

/// Ascent approximation used to place the first baseline below a block's top edge.
const ASCENT_RATIO: f32 = 0.8;

/// Paint and font settings for one run of vector text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Resolved font family.
    pub family: String,
    /// Font size in pixels.
    pub size_px: f32,
    /// Fill color.
    pub fill: Rgb8,
    /// Optional outline color and width in pixels, painted under the fill.
    pub stroke: Option<(Rgb8, f32)>,
}

/// Translucent rectangle painted behind a [`TextBlock`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBacking {
    /// Rectangle color.
    pub color: Rgb8,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Padding around the text lines in pixels.
    pub padding: f32,
    /// Width of the rectangle before padding.
    pub width: f32,
}

/// Horizontally centered lines of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Lines, already wrapped.
    pub lines: Vec<String>,
    /// Text style shared by all lines.
    pub style: TextStyle,
    /// X coordinate lines are centered on.
    pub center_x: f32,
    /// Top edge of the first line.
    pub top_y: f32,
    /// Distance between consecutive baselines.
    pub line_height: f32,
    /// Optional backing rectangle.
    pub backing: Option<TextBacking>,
}

impl TextBlock {
    /// Total height of the lines (without backing padding).
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

impl TextEngine {
    /// Rendered width of a single line in pixels.
    ///
    /// Errors when non-blank text produces no glyph outlines, which is how a missing or broken
    /// font shows up.
    pub fn measure(&self, style: &TextStyle, text: &str) -> NewsreelResult<f32> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }
        let size = style.size_px;
        let approx_w = (text.chars().count() as f32 * size * 1.5).ceil().max(1.0);
        let approx_h = (size * 2.0).ceil().max(1.0);
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{approx_w}" height="{approx_h}">"#
        );
        push_text_element(&mut svg, style, 0.0, size, "start", text);
        svg.push_str("</svg>");

        let tree = self.parse_svg(&svg)?;
        let width = tree.root().bounding_box().width();
        if !width.is_finite() || width <= 0.0 {
            return Err(NewsreelError::text(format!(
                "font '{}' produced no glyphs",
                style.family
            )));
        }
        Ok(width)
    }

    /// Word-wrap `text` so every line fits in `max_width` pixels where possible.
    pub fn wrap(
        &self,
        style: &TextStyle,
        text: &str,
        max_width: f32,
    ) -> NewsreelResult<Vec<String>> {
        let mut failure = None;
        let lines = wrap_words(text, max_width, |candidate| {
            match self.measure(style, candidate) {
                Ok(w) => w,
                Err(e) => {
                    failure.get_or_insert(e);
                    0.0
                }
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(lines),
        }
    }

    /// Rasterize `blocks` onto a transparent layer of `canvas` size.
    pub fn rasterize(&self, canvas: Canvas, blocks: &[TextBlock]) -> NewsreelResult<PremulLayer> {
        let svg = blocks_to_svg(canvas, blocks);
        let tree = self.parse_svg(&svg)?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| NewsreelError::text("failed to allocate text pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        Ok(PremulLayer {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.take(),
        })
    }

    fn parse_svg(&self, svg: &str) -> NewsreelResult<usvg::Tree> {
        let mut opt = usvg::Options::default();
        opt.fontdb = self.fontdb();
        usvg::Tree::from_str(svg, &opt)
            .map_err(|e| NewsreelError::text(format!("failed to lay out text: {e}")))
    }
}

/// SVG document holding `blocks` on a `canvas`-sized viewport.
pub(crate) fn blocks_to_svg(canvas: Canvas, blocks: &[TextBlock]) -> String {
    let (w, h) = (canvas.width, canvas.height);
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );

    for block in blocks {
        if let Some(b) = block.backing
            && b.opacity > 0.0
            && !block.lines.is_empty()
        {
            let _ = write!(
                svg,
                r#"<rect x="{x}" y="{y}" width="{bw}" height="{bh}" rx="8" fill="{fill}" fill-opacity="{op}"/>"#,
                x = block.center_x - b.width / 2.0 - b.padding,
                y = block.top_y - b.padding,
                bw = b.width + 2.0 * b.padding,
                bh = block.height() + 2.0 * b.padding,
                fill = b.color.to_hex(),
                op = b.opacity.clamp(0.0, 1.0),
            );
        }

        for (i, line) in block.lines.iter().enumerate() {
            let baseline =
                block.top_y + i as f32 * block.line_height + block.style.size_px * ASCENT_RATIO;
            push_text_element(
                &mut svg,
                &block.style,
                block.center_x,
                baseline,
                "middle",
                line,
            );
        }
    }

    svg.push_str("</svg>");
    svg
}

fn push_text_element(svg: &mut String, style: &TextStyle, x: f32, y: f32, anchor: &str, text: &str) {
    let family = escape_xml(&style.family.replace('\'', ""));
    let _ = write!(
        svg,
        r#"<text x="{x}" y="{y}" font-family="'{family}'" font-size="{size}" fill="{fill}" text-anchor="{anchor}""#,
        size = style.size_px,
        fill = style.fill.to_hex(),
    );
    if let Some((color, width)) = style.stroke {
        let _ = write!(
            svg,
            r#" stroke="{}" stroke-width="{width}" stroke-linejoin="round" paint-order="stroke""#,
            color.to_hex()
        );
    }
    let _ = write!(
        svg,
        r#" xml:space="preserve">{}</text>"#,
        escape_xml(text)
    );
}

/// Escape text for use in SVG character data and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle {
            family: "Test Serif".to_string(),
            size_px: 40.0,
            fill: Rgb8::WHITE,
            stroke: Some((Rgb8::BLACK, 2.0)),
        }
    }

    #[test]
    fn escape_handles_markup_and_controls() {
        assert_eq!(escape_xml("a<b & \"c\"\n"), "a&lt;b &amp; &quot;c&quot; ");
    }

    #[test]
    fn svg_places_lines_and_backing() {
        let block = TextBlock {
            lines: vec!["first".to_string(), "second".to_string()],
            style: style(),
            center_x: 640.0,
            top_y: 576.0,
            line_height: 48.0,
            backing: Some(TextBacking {
                color: Rgb8::BLACK,
                opacity: 0.35,
                padding: 12.0,
                width: 1100.0,
            }),
        };
        let svg = blocks_to_svg(Canvas::HD_720, &[block]);
        assert!(svg.contains(r#"viewBox="0 0 1280 720""#));
        assert!(svg.contains("<rect"));
        assert!(svg.contains(r#"fill-opacity="0.35""#));
        assert!(svg.contains(r#"paint-order="stroke""#));
        assert_eq!(svg.matches("<text").count(), 2);
        assert!(svg.contains(">second</text>"));
    }

    #[test]
    fn rasterize_without_fonts_draws_backing_only() {
        let engine = TextEngine::without_fonts();
        let canvas = Canvas {
            width: 64,
            height: 32,
        };
        let block = TextBlock {
            lines: vec!["hello".to_string()],
            style: style(),
            center_x: 32.0,
            top_y: 8.0,
            line_height: 12.0,
            backing: Some(TextBacking {
                color: Rgb8::BLACK,
                opacity: 0.5,
                padding: 2.0,
                width: 40.0,
            }),
        };
        let layer = engine.rasterize(canvas, &[block]).unwrap();
        assert_eq!(layer.data.len(), canvas.rgba_len());
        assert!(layer.has_coverage());
    }

    #[test]
    fn measure_without_fonts_is_a_text_error() {
        let engine = TextEngine::without_fonts();
        let err = engine.measure(&style(), "hello").unwrap_err();
        assert!(matches!(err, NewsreelError::Text(_)));
        assert_eq!(engine.measure(&style(), "  ").unwrap(), 0.0);
    }
}
