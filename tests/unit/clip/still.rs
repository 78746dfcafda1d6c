use super::*;

#[test]
fn ramp_runs_from_one_to_end_scale() {
    let ramp = ZoomRamp::ken_burns(10.0);
    assert_eq!(ramp.scale_at(0.0), 1.0);
    assert!((ramp.scale_at(5.0) - 1.01).abs() < 1e-12);
    assert!((ramp.scale_at(10.0) - ZOOM_END_SCALE).abs() < 1e-12);
    assert!((ramp.scale_at(99.0) - ZOOM_END_SCALE).abs() < 1e-12);
    assert_eq!(ramp.scale_at(-1.0), 1.0);
}

#[test]
fn ramp_is_monotonic() {
    let ramp = ZoomRamp::ken_burns(7.5);
    let mut prev = 0.0;
    for i in 0..=180 {
        let s = ramp.scale_at(f64::from(i) / 24.0);
        assert!(s >= prev);
        prev = s;
    }
}

#[test]
fn zero_length_ramp_stays_at_one() {
    assert_eq!(ZoomRamp::ken_burns(0.0).scale_at(3.0), 1.0);
}

#[test]
fn fit_height_keeps_aspect() {
    let src = image::RgbaImage::from_pixel(400, 200, image::Rgba([10, 20, 30, 255]));
    let fitted = fit_height(&src, 100);
    assert_eq!(fitted.dimensions(), (200, 100));
}

#[test]
fn narrow_image_is_centered_over_background() {
    let canvas = Canvas {
        width: 40,
        height: 20,
    };
    let src = image::RgbaImage::from_pixel(10, 20, image::Rgba([200, 0, 0, 255]));
    let mut out = FrameRGBA::filled(canvas, Rgb8::WHITE);
    render_zoomed(&src, 1.0, Rgb8::BLACK, &mut out);
    assert_eq!(out.pixel(0, 10), [0, 0, 0, 255]);
    assert_eq!(out.pixel(39, 10), [0, 0, 0, 255]);
    assert_eq!(out.pixel(20, 10), [200, 0, 0, 255]);
    assert_eq!(out.pixel(15, 0), [200, 0, 0, 255]);
}

#[test]
fn zoom_grows_the_covered_area() {
    let canvas = Canvas {
        width: 100,
        height: 50,
    };
    let src = image::RgbaImage::from_pixel(50, 50, image::Rgba([0, 255, 0, 255]));
    let covered = |scale: f64| {
        let mut out = FrameRGBA::filled(canvas, Rgb8::BLACK);
        render_zoomed(&src, scale, Rgb8::BLACK, &mut out);
        out.data.chunks_exact(4).filter(|px| px[1] > 0).count()
    };
    assert!(covered(1.2) > covered(1.0));
}

#[test]
fn transparent_pixels_show_background() {
    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    let src = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 255, 255, 0]));
    let mut out = FrameRGBA::filled(canvas, Rgb8::WHITE);
    render_zoomed(&src, 1.0, Rgb8(30, 30, 50), &mut out);
    assert!(out.data.chunks_exact(4).all(|px| px == [30, 30, 50, 255]));
}

#[test]
fn undecodable_file_is_a_media_error() {
    let path = std::env::temp_dir().join(format!("newsreel_not_an_image_{}.png", std::process::id()));
    std::fs::write(&path, b"definitely not a png").unwrap();
    let err = load_still(&path, Canvas::HD_720).unwrap_err();
    let _ = std::fs::remove_file(&path);
    assert!(matches!(err, NewsreelError::Media(_)));
}
