use crate::foundation::error::{NewsreelError, NewsreelResult};

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` in timeline space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> NewsreelResult<Self> {
        if start.0 > end.0 {
            return Err(NewsreelError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Output frame rate of every rendered video.
    pub const OUTPUT: Fps = Fps { num: 24, den: 1 };

    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> NewsreelResult<Self> {
        if den == 0 {
            return Err(NewsreelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(NewsreelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to a frame boundary, rounding to the nearest frame.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self::OUTPUT
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// 1280x720, the fixed output resolution.
    pub const HD_720: Canvas = Canvas {
        width: 1280,
        height: 720,
    };

    /// Reject empty or odd-sized canvases (yuv420p needs even dimensions).
    pub fn validate(self) -> NewsreelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(NewsreelError::validation("canvas width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(NewsreelError::validation(format!(
                "canvas {}x{} must have even dimensions",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Bytes in one RGBA8 frame of this size.
    pub fn rgba_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::HD_720
    }
}

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    /// Pure black, the letterbox color.
    pub const BLACK: Rgb8 = Rgb8(0, 0, 0);
    /// Pure white, the text color.
    pub const WHITE: Rgb8 = Rgb8(255, 255, 255);

    /// Opaque RGBA8 representation.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.0, self.1, self.2, 255]
    }

    /// `#rrggbb` form for SVG attributes.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Linear interpolation between two colors, `t` in `[0, 1]`.
    pub fn lerp(self, other: Rgb8, t: f64) -> Rgb8 {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb8(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}
