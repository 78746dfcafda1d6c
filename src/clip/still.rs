use std::path::Path;

use rayon::prelude::*;

use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::render::frame::FrameRGBA;

/// Zoom factor a still reaches at the end of its clip.
pub const ZOOM_END_SCALE: f64 = 1.02;

/// Continuous linear zoom about the canvas center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomRamp {
    /// Time over which the zoom runs.
    pub duration_secs: f64,
    /// Scale reached at `duration_secs` (scale is 1.0 at t = 0).
    pub end_scale: f64,
}

impl ZoomRamp {
    /// The standard slow zoom-in over `duration_secs`.
    pub fn ken_burns(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            end_scale: ZOOM_END_SCALE,
        }
    }

    /// Scale factor at clip-relative time `t_secs`, clamped to the ramp.
    pub fn scale_at(&self, t_secs: f64) -> f64 {
        if self.duration_secs.is_nan() || self.duration_secs <= 0.0 {
            return 1.0;
        }
        let p = (t_secs / self.duration_secs).clamp(0.0, 1.0);
        1.0 + (self.end_scale - 1.0) * p
    }
}

/// Decode an image file and scale it so its height matches the canvas height.
pub fn load_still(path: &Path, canvas: Canvas) -> NewsreelResult<image::RgbaImage> {
    let decoded = image::open(path).map_err(|e| {
        NewsreelError::media(format!("failed to decode image '{}': {e}", path.display()))
    })?;
    let src = decoded.to_rgba8();
    if src.width() == 0 || src.height() == 0 {
        return Err(NewsreelError::media(format!(
            "image '{}' is empty",
            path.display()
        )));
    }
    Ok(fit_height(&src, canvas.height))
}

/// Resize `src` to `height`, keeping its aspect ratio.
pub fn fit_height(src: &image::RgbaImage, height: u32) -> image::RgbaImage {
    let width = ((f64::from(src.width()) * f64::from(height) / f64::from(src.height())).round()
        as u32)
        .max(1);
    if width == src.width() && height == src.height() {
        return src.clone();
    }
    image::imageops::resize(src, width, height, image::imageops::FilterType::Lanczos3)
}

/// Draw `src` centered on `out`, scaled by `scale` about the canvas center, over `bg`.
///
/// Pixels the image does not cover show `bg`; image alpha is blended over `bg`.
pub fn render_zoomed(src: &image::RgbaImage, scale: f64, bg: Rgb8, out: &mut FrameRGBA) {
    out.fill(bg);

    let (fw, fh) = (f64::from(out.width), f64::from(out.height));
    let (iw, ih) = (f64::from(src.width()), f64::from(src.height()));
    let (dw, dh) = (iw * scale, ih * scale);
    let x0 = (fw - dw) / 2.0;
    let y0 = (fh - dh) / 2.0;

    let x_start = x0.max(0.0).floor() as usize;
    let x_end = (x0 + dw).min(fw).ceil() as usize;
    let y_start = y0.max(0.0).floor() as usize;
    let y_end = (y0 + dh).min(fh).ceil() as usize;
    let row_bytes = out.width as usize * 4;
    let bg_rgba = bg.to_rgba();

    out.data
        .par_chunks_mut(row_bytes)
        .enumerate()
        .skip(y_start)
        .take(y_end.saturating_sub(y_start))
        .for_each(|(y, row)| {
            let v = (y as f64 + 0.5 - y0) / scale - 0.5;
            if v < -0.5 || v > ih - 0.5 {
                return;
            }
            for x in x_start..x_end {
                let u = (x as f64 + 0.5 - x0) / scale - 0.5;
                if u < -0.5 || u > iw - 0.5 {
                    continue;
                }
                let px = sample_bilinear(src, u, v);
                let d = &mut row[x * 4..x * 4 + 4];
                blend_over_opaque(d, px, bg_rgba);
            }
        });
}

fn sample_bilinear(src: &image::RgbaImage, u: f64, v: f64) -> [f32; 4] {
    let max_x = src.width() as i64 - 1;
    let max_y = src.height() as i64 - 1;
    let u = u.clamp(0.0, max_x as f64);
    let v = v.clamp(0.0, max_y as f64);
    let x0 = u.floor() as i64;
    let y0 = v.floor() as i64;
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);
    let fx = (u - x0 as f64) as f32;
    let fy = (v - y0 as f64) as f32;

    let p = |x: i64, y: i64| src.get_pixel(x as u32, y as u32).0;
    let (p00, p10, p01, p11) = (p(x0, y0), p(x1, y0), p(x0, y1), p(x1, y1));

    let mut out = [0f32; 4];
    for c in 0..4 {
        let top = f32::from(p00[c]) + (f32::from(p10[c]) - f32::from(p00[c])) * fx;
        let bottom = f32::from(p01[c]) + (f32::from(p11[c]) - f32::from(p01[c])) * fx;
        out[c] = top + (bottom - top) * fy;
    }
    out
}

fn blend_over_opaque(dst: &mut [u8], src: [f32; 4], bg: [u8; 4]) {
    let a = (src[3] / 255.0).clamp(0.0, 1.0);
    for c in 0..3 {
        let v = src[c] * a + f32::from(bg[c]) * (1.0 - a);
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = 255;
}

#[cfg(test)]
#[path = "../../tests/unit/clip/still.rs"]
mod tests;
