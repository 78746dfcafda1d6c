use super::*;
use crate::foundation::core::Fps;

const SMALL: Canvas = Canvas {
    width: 64,
    height: 36,
};

struct Failing;

impl CaptionRenderer for Failing {
    fn render(&self, _text: &str, _canvas: Canvas) -> NewsreelResult<PremulLayer> {
        Err(NewsreelError::text("renderer unavailable"))
    }
}

struct Recording(std::sync::Mutex<Vec<String>>);

impl CaptionRenderer for Recording {
    fn render(&self, text: &str, canvas: Canvas) -> NewsreelResult<PremulLayer> {
        if let Ok(mut seen) = self.0.lock() {
            seen.push(text.to_string());
        }
        let mut layer = PremulLayer::transparent(canvas);
        layer.data[3] = 255;
        Ok(layer)
    }
}

struct WrongSize;

impl CaptionRenderer for WrongSize {
    fn render(&self, _text: &str, _canvas: Canvas) -> NewsreelResult<PremulLayer> {
        Ok(PremulLayer::transparent(Canvas {
            width: 2,
            height: 2,
        }))
    }
}

fn clip() -> VisualClip {
    VisualClip::solid(1, 2.0, SMALL, Fps::OUTPUT, Rgb8(30, 30, 50))
}

#[test]
fn failing_renderer_yields_bare_clip() {
    let c = composite_scene(clip(), "Stocks fell sharply today", Some(&Failing));
    assert!(!c.has_caption());
    assert_eq!(c.duration_secs(), 2.0);
    assert_eq!(c.clip.scene_number, 1);
}

#[test]
fn successful_render_attaches_overlay() {
    let r = Recording(std::sync::Mutex::new(Vec::new()));
    let c = composite_scene(clip(), "Hello world", Some(&r));
    assert!(c.has_caption());
    assert_eq!(r.0.lock().unwrap().as_slice(), ["Hello world"]);
}

#[test]
fn blank_narration_or_no_renderer_skips_caption() {
    let r = Recording(std::sync::Mutex::new(Vec::new()));
    assert!(!composite_scene(clip(), "   ", Some(&r)).has_caption());
    assert!(r.0.lock().unwrap().is_empty());
    assert!(!composite_scene(clip(), "text", None).has_caption());
}

#[test]
fn mismatched_layer_is_dropped() {
    assert!(!composite_scene(clip(), "text", Some(&WrongSize)).has_caption());
}

#[test]
fn svg_renderer_without_fonts_errors_instead_of_drawing() {
    let style = CaptionStyle::from_config(&CaptionConfig::default(), "Missing Serif", 0.05);
    let r = SvgCaptionRenderer::new(TextEngine::without_fonts(), style);
    assert!(r.render("Some caption", SMALL).is_err());
    assert!(!composite_scene(clip(), "Some caption", Some(&r)).has_caption());
}

#[test]
fn from_config_disables_when_unavailable() {
    let engine = TextEngine::without_fonts();
    assert!(SvgCaptionRenderer::from_config(&RenderConfig::default(), &engine).is_none());

    let mut cfg = RenderConfig::default();
    cfg.caption.enabled = false;
    assert!(SvgCaptionRenderer::from_config(&cfg, &engine).is_none());
}

#[test]
fn style_scales_with_canvas() {
    let style = CaptionStyle::from_config(&CaptionConfig::default(), "Serif", 0.5);
    assert_eq!(style.font_size, 20.0);
    assert_eq!(style.max_width, 550.0);
    assert_eq!(style.stroke_width, 1.0);
    assert_eq!(style.anchor_y, 0.8);
    assert_eq!(style.max_chars, 100);
}
