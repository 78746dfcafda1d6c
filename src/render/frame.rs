use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::foundation::math::mul_div255_u8;

/// One output frame as opaque RGBA8 pixels.
///
/// Alpha is always 255; overlays are flattened into the frame as they are applied, so frames can
/// be handed to the encoder without further conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Frame of `canvas` size filled with `color`.
    pub fn filled(canvas: Canvas, color: Rgb8) -> Self {
        let mut data = vec![0u8; canvas.rgba_len()];
        fill_rgba(&mut data, color);
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    /// Canvas this frame covers.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgb8) {
        fill_rgba(&mut self.data, color);
    }

    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Source-over a premultiplied layer of the same size onto this frame.
    pub fn composite(&mut self, layer: &PremulLayer) -> NewsreelResult<()> {
        if layer.width != self.width || layer.height != self.height {
            return Err(NewsreelError::validation(format!(
                "layer size {}x{} does not match frame {}x{}",
                layer.width, layer.height, self.width, self.height
            )));
        }
        premul_over_opaque_in_place(&mut self.data, &layer.data);
        Ok(())
    }

    /// Copy into an `image` buffer (for writing PNG/JPEG files).
    pub fn to_rgb_image(&self) -> image::RgbImage {
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.data.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }
        // Length is width*height*3 by construction.
        image::RgbImage::from_raw(self.width, self.height, rgb)
            .unwrap_or_else(|| image::RgbImage::new(self.width, self.height))
    }
}

/// Full-canvas overlay in premultiplied RGBA8 (the layout `resvg` renders into).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PremulLayer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, row-major.
    pub data: Vec<u8>,
}

impl PremulLayer {
    /// Fully transparent layer.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.rgba_len()],
        }
    }

    /// `true` when at least one pixel has non-zero alpha.
    pub fn has_coverage(&self) -> bool {
        self.data.chunks_exact(4).any(|px| px[3] != 0)
    }
}

fn fill_rgba(data: &mut [u8], color: Rgb8) {
    let rgba = color.to_rgba();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

/// Source-over of premultiplied `src` onto opaque `dst`; `dst` stays opaque.
fn premul_over_opaque_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - sa;
        for c in 0..3 {
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = s[c].saturating_add(dc);
        }
        d[3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: Canvas = Canvas {
        width: 2,
        height: 2,
    };

    #[test]
    fn opaque_layer_pixel_replaces_frame() {
        let mut frame = FrameRGBA::filled(TINY, Rgb8(10, 20, 30));
        let mut layer = PremulLayer::transparent(TINY);
        layer.data[..4].copy_from_slice(&[200, 100, 50, 255]);
        frame.composite(&layer).unwrap();
        assert_eq!(frame.pixel(0, 0), [200, 100, 50, 255]);
        assert_eq!(frame.pixel(1, 1), [10, 20, 30, 255]);
    }

    #[test]
    fn half_alpha_blends_and_stays_opaque() {
        let mut frame = FrameRGBA::filled(TINY, Rgb8(0, 0, 200));
        let mut layer = PremulLayer::transparent(TINY);
        layer.data[..4].copy_from_slice(&[128, 0, 0, 128]);
        frame.composite(&layer).unwrap();
        let px = frame.pixel(0, 0);
        assert_eq!(px[0], 128);
        assert!(px[2] > 90 && px[2] < 110);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn mismatched_layer_is_rejected() {
        let mut frame = FrameRGBA::filled(TINY, Rgb8::BLACK);
        let layer = PremulLayer::transparent(Canvas {
            width: 4,
            height: 2,
        });
        assert!(frame.composite(&layer).is_err());
    }
}
