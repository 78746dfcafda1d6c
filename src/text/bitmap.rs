use crate::foundation::core::Rgb8;
use crate::render::frame::FrameRGBA;

/// Glyph cell width in font pixels.
pub const GLYPH_W: u32 = 5;
/// Glyph cell height in font pixels.
pub const GLYPH_H: u32 = 7;
/// Horizontal gap between glyphs in font pixels.
const GAP_X: u32 = 1;
/// Vertical gap between lines in font pixels.
const GAP_Y: u32 = 3;

// Rows top to bottom, bit 4 is the leftmost column.
const UNKNOWN: [u8; 7] = [
    0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111,
];

/// Bitmap for `c`. Lowercase letters share the uppercase shapes; anything without a glyph is a
/// hollow box.
pub fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        ' ' => [0, 0, 0, 0, 0, 0, 0],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0, 0, 0, 0, 0, 0b01100, 0b01100],
        ',' => [0, 0, 0, 0, 0b01100, 0b00100, 0b01000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0, 0b00100],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0, 0b00100],
        '\'' => [0b00100, 0b00100, 0b01000, 0, 0, 0, 0],
        '"' => [0b01010, 0b01010, 0b01010, 0, 0, 0, 0],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        ':' => [0, 0b01100, 0b01100, 0, 0b01100, 0b01100, 0],
        ';' => [0, 0b01100, 0b01100, 0, 0b01100, 0b00100, 0b01000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '/' => [0b00001, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '%' => [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011],
        '$' => [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100],
        '+' => [0, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0],
        '=' => [0, 0, 0b11111, 0, 0b11111, 0, 0],
        '#' => [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
        '@' => [0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110],
        '_' => [0, 0, 0, 0, 0, 0, 0b11111],
        _ => UNKNOWN,
    }
}

/// Integer scale that makes glyphs roughly `size_px` tall.
pub fn scale_for_size(size_px: f32) -> u32 {
    ((size_px / (GLYPH_H + 1) as f32).round() as u32).max(1)
}

/// Width in pixels of `text` on one line.
pub fn line_width_px(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    (n * (GLYPH_W + GAP_X) - GAP_X) * scale
}

/// Baseline-to-baseline distance in pixels.
pub fn line_height_px(scale: u32) -> u32 {
    (GLYPH_H + GAP_Y) * scale
}

/// Word-wrap `text` into lines no wider than `max_width_px`.
pub fn wrap(text: &str, scale: u32, max_width_px: u32) -> Vec<String> {
    crate::text::wrap_words(text, max_width_px as f32, |s| line_width_px(s, scale) as f32)
}

/// Draw one line with its top-left corner at `(x, y)`; pixels outside the frame are clipped.
pub fn draw_line(frame: &mut FrameRGBA, text: &str, x: i64, y: i64, scale: u32, color: Rgb8) {
    let rgba = color.to_rgba();
    let (fw, fh) = (i64::from(frame.width), i64::from(frame.height));
    let s = i64::from(scale);
    let advance = i64::from(GLYPH_W + GAP_X) * s;

    for (i, c) in text.chars().enumerate() {
        let gx = x + i as i64 * advance;
        if gx >= fw {
            break;
        }
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let px0 = gx + i64::from(col) * s;
                let py0 = y + row as i64 * s;
                for py in py0.max(0)..(py0 + s).min(fh) {
                    for px in px0.max(0)..(px0 + s).min(fw) {
                        let idx = ((py * fw + px) * 4) as usize;
                        frame.data[idx..idx + 4].copy_from_slice(&rgba);
                    }
                }
            }
        }
    }
}

/// Draw `lines` centered horizontally on the frame, with the block's vertical center at
/// `center_y`.
pub fn draw_centered(frame: &mut FrameRGBA, lines: &[String], scale: u32, color: Rgb8, center_y: i64) {
    let lh = i64::from(line_height_px(scale));
    let block_h = lines.len() as i64 * lh - i64::from(GAP_Y * scale);
    let mut y = center_y - block_h / 2;
    for line in lines {
        let w = i64::from(line_width_px(line, scale));
        let x = (i64::from(frame.width) - w) / 2;
        draw_line(frame, line, x, y, scale, color);
        y += lh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Canvas;

    #[test]
    fn lowercase_shares_uppercase_glyphs() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('é'), UNKNOWN);
        assert_eq!(glyph(' '), [0; 7]);
    }

    #[test]
    fn widths_scale_linearly() {
        assert_eq!(line_width_px("", 3), 0);
        assert_eq!(line_width_px("A", 1), 5);
        assert_eq!(line_width_px("AB", 2), 22);
        assert_eq!(scale_for_size(50.0), 6);
        assert_eq!(scale_for_size(1.0), 1);
    }

    #[test]
    fn wrap_respects_pixel_width() {
        // 11 px per pair of glyphs at scale 1.
        let lines = wrap("ab cd ef", 1, 17);
        assert_eq!(lines, vec!["ab", "cd", "ef"]);
        let lines = wrap("ab cd ef", 1, 29);
        assert_eq!(lines, vec!["ab cd", "ef"]);
    }

    #[test]
    fn drawing_is_clipped_to_frame() {
        let canvas = Canvas {
            width: 8,
            height: 8,
        };
        let mut frame = FrameRGBA::filled(canvas, Rgb8::BLACK);
        draw_line(&mut frame, "I", -2, -3, 2, Rgb8::WHITE);
        draw_line(&mut frame, "WW", 6, 6, 2, Rgb8::WHITE);
        assert!(frame.data.chunks_exact(4).any(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn centered_text_lands_in_the_middle() {
        let canvas = Canvas {
            width: 40,
            height: 20,
        };
        let mut frame = FrameRGBA::filled(canvas, Rgb8::BLACK);
        draw_centered(&mut frame, &["H".to_string()], 1, Rgb8::WHITE, 10);
        // 'H' spans x 17..22, y 7..14; its top-left pixel is lit.
        assert_eq!(frame.pixel(17, 7), [255, 255, 255, 255]);
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 255]);
    }
}
