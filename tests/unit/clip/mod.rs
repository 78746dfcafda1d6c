use super::*;
use crate::script::model::MediaKind;

const SMALL: Canvas = Canvas {
    width: 64,
    height: 36,
};

fn ctx() -> ClipContext {
    let cfg = RenderConfig {
        canvas: SMALL,
        ..RenderConfig::default()
    };
    ClipContext::from_config(&cfg, TextEngine::without_fonts())
}

fn temp_path(name: &str) -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("newsreel_clip_{}_{nanos}_{name}", std::process::id()))
}

#[test]
fn context_scales_placeholder_sizes() {
    let c = ctx();
    assert_eq!(c.placeholder.background, Rgb8(30, 30, 50));
    assert!((c.placeholder.font_size - 50.0 * 36.0 / 720.0).abs() < 1e-4);
    assert_eq!(c.placeholder_font, FontChoice::Bitmap);
}

#[test]
fn no_media_gives_placeholder_of_exact_duration() {
    let scene = Scene::new(1, "Markets rally", "");
    let clip = build_visual_clip(&scene, 2.5, None, &ctx());
    assert_eq!(clip.origin(), ClipOrigin::Placeholder);
    assert_eq!(clip.duration_secs, 2.5);
    assert_eq!(clip.canvas, SMALL);
    assert_eq!(clip.frame_count(), 60);

    let mut frames = clip.open().unwrap();
    let mut out = FrameRGBA::filled(SMALL, Rgb8::BLACK);
    frames.next_into(&mut out).unwrap();
    assert_eq!(out.pixel(0, 0), [30, 30, 50, 255]);
}

#[test]
fn missing_file_falls_back_to_placeholder() {
    let scene = Scene::new(2, "Text", "");
    let media = MediaFile {
        scene_number: 2,
        path: temp_path("missing.jpg"),
        kind: MediaKind::Image,
    };
    let clip = build_visual_clip(&scene, 1.0, Some(&media), &ctx());
    assert_eq!(clip.origin(), ClipOrigin::Placeholder);
}

#[test]
fn corrupt_video_falls_back_to_placeholder() {
    let scene = Scene::new(3, "Text", "");
    let path = temp_path("corrupt.mp4");
    std::fs::write(&path, b"not a video").unwrap();
    let media = MediaFile {
        scene_number: 3,
        path: path.clone(),
        kind: MediaKind::Video,
    };
    let clip = build_visual_clip(&scene, 1.0, Some(&media), &ctx());
    let _ = std::fs::remove_file(&path);
    assert_eq!(clip.origin(), ClipOrigin::Placeholder);
}

#[test]
fn image_media_zooms_over_the_clip() {
    let path = temp_path("still.png");
    image::RgbaImage::from_pixel(32, 36, image::Rgba([0, 0, 255, 255]))
        .save(&path)
        .unwrap();
    let scene = Scene::new(1, "Text", "");
    let media = MediaFile {
        scene_number: 1,
        path: path.clone(),
        kind: MediaKind::Image,
    };
    let clip = build_visual_clip(&scene, 4.0, Some(&media), &ctx());
    let _ = std::fs::remove_file(&path);
    assert_eq!(clip.origin(), ClipOrigin::Image);
    let ClipSource::Still { zoom, .. } = &clip.source else {
        panic!("expected a still source");
    };
    assert_eq!(zoom.duration_secs, 4.0);
    assert_eq!(zoom.end_scale, ZOOM_END_SCALE);

    let mut frames = clip.open().unwrap();
    let mut out = FrameRGBA::filled(SMALL, Rgb8::WHITE);
    frames.next_into(&mut out).unwrap();
    assert_eq!(out.pixel(32, 18), [0, 0, 255, 255]);
    assert_eq!(out.pixel(0, 18), [0, 0, 0, 255]);
}

#[test]
fn held_frames_repeat_after_caller_writes() {
    let clip = VisualClip::solid(1, 1.0, SMALL, Fps::OUTPUT, Rgb8(9, 8, 7));
    let mut frames = clip.open().unwrap();
    let mut out = FrameRGBA::filled(SMALL, Rgb8::BLACK);
    frames.next_into(&mut out).unwrap();
    out.fill(Rgb8::WHITE);
    frames.next_into(&mut out).unwrap();
    assert_eq!(out.pixel(5, 5), [9, 8, 7, 255]);
}

#[test]
fn mismatched_buffer_is_rejected() {
    let clip = VisualClip::solid(1, 1.0, SMALL, Fps::OUTPUT, Rgb8::BLACK);
    let mut frames = clip.open().unwrap();
    let mut out = FrameRGBA::filled(Canvas { width: 2, height: 2 }, Rgb8::BLACK);
    assert!(frames.next_into(&mut out).is_err());
}
