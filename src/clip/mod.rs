//! Visual clip builder.
//!
//! Every scene gets a clip of exactly its allocated duration, built from the scene's image,
//! its video, or a text placeholder. Building never fails: a missing or broken asset is logged
//! and replaced by the placeholder.

use std::sync::Arc;

use crate::config::RenderConfig;
use crate::foundation::core::{Canvas, Fps, Rgb8};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::render::frame::FrameRGBA;
use crate::script::model::{MediaFile, MediaKind, Scene};
use crate::text::{FontChoice, TextEngine};

/// Placeholder frames: flat background plus centered text.
pub mod placeholder;
/// Still images with a slow zoom.
pub mod still;
/// Looped or trimmed video sources.
pub mod video;

pub use placeholder::{PlaceholderStyle, render_placeholder};
pub use still::{ZOOM_END_SCALE, ZoomRamp};
pub use video::{VideoFit, VideoPlan};

/// Everything the builder needs besides the scene itself.
#[derive(Clone, Debug)]
pub struct ClipContext {
    /// Output resolution.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Letterbox color behind media that does not fill the canvas.
    pub background: Rgb8,
    /// Placeholder look, in canvas pixels.
    pub placeholder: PlaceholderStyle,
    /// Font resolved once for placeholder text.
    pub placeholder_font: FontChoice,
    /// Shared font database.
    pub text: TextEngine,
}

impl ClipContext {
    /// Build a context from `cfg`, resolving the placeholder font against `text`.
    pub fn from_config(cfg: &RenderConfig, text: TextEngine) -> Self {
        let scale = cfg.px_scale();
        let p = &cfg.placeholder;
        let placeholder_font = text.resolve(&p.font_families);
        if placeholder_font == FontChoice::Bitmap {
            tracing::info!("no placeholder font family installed, using the bitmap font");
        }
        Self {
            canvas: cfg.canvas,
            fps: cfg.fps,
            background: cfg.background,
            placeholder: PlaceholderStyle {
                background: p.background,
                color: Rgb8::WHITE,
                font_size: p.font_size * scale,
                max_width: p.max_width * scale,
                max_chars: p.max_chars,
            },
            placeholder_font,
            text,
        }
    }
}

/// Where a clip's pixels come from.
#[derive(Clone, Debug)]
pub enum ClipSource {
    /// Height-fitted still image under a zoom ramp.
    Still {
        /// Decoded image, already scaled to the canvas height.
        image: Arc<image::RgbaImage>,
        /// Zoom over the clip.
        zoom: ZoomRamp,
    },
    /// Streamed video source.
    Video(VideoPlan),
    /// One frame held for the whole clip.
    Frame(Arc<FrameRGBA>),
}

/// Kind of clip a scene ended up with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipOrigin {
    /// Built from an image asset.
    Image,
    /// Built from a video asset.
    Video,
    /// Synthesized stand-in.
    Placeholder,
}

/// A fixed-duration, fixed-resolution visual stream for one scene.
#[derive(Clone, Debug)]
pub struct VisualClip {
    /// Scene this clip belongs to.
    pub scene_number: u32,
    /// Clip length in seconds.
    pub duration_secs: f64,
    /// Frame size.
    pub canvas: Canvas,
    /// Frame rate frames are produced at.
    pub fps: Fps,
    /// Letterbox color.
    pub background: Rgb8,
    /// Pixel source.
    pub source: ClipSource,
    origin: ClipOrigin,
}

impl VisualClip {
    /// Clip that shows `frame` for its whole duration.
    pub fn held_frame(scene_number: u32, duration_secs: f64, fps: Fps, frame: FrameRGBA) -> Self {
        Self {
            scene_number,
            duration_secs,
            canvas: frame.canvas(),
            fps,
            background: Rgb8::BLACK,
            source: ClipSource::Frame(Arc::new(frame)),
            origin: ClipOrigin::Placeholder,
        }
    }

    /// Single-color clip.
    pub fn solid(scene_number: u32, duration_secs: f64, canvas: Canvas, fps: Fps, color: Rgb8) -> Self {
        Self::held_frame(scene_number, duration_secs, fps, FrameRGBA::filled(canvas, color))
    }

    /// How the clip was built.
    pub fn origin(&self) -> ClipOrigin {
        self.origin
    }

    /// Number of frames the clip spans at its frame rate.
    pub fn frame_count(&self) -> u64 {
        self.fps.secs_to_frames_round(self.duration_secs)
    }

    /// Start producing frames from the beginning of the clip.
    pub fn open(&self) -> NewsreelResult<ClipFrames<'_>> {
        let state = match &self.source {
            ClipSource::Video(plan) => FrameState::Video(video::VideoFrames::spawn(
                plan,
                self.canvas,
                self.fps,
                self.background,
            )?),
            ClipSource::Still { .. } => FrameState::Still,
            ClipSource::Frame(_) => FrameState::Held,
        };
        Ok(ClipFrames {
            clip: self,
            next: 0,
            state,
        })
    }
}

enum FrameState {
    Still,
    Video(video::VideoFrames),
    Held,
}

/// Sequential frame reader over a [`VisualClip`].
///
/// Reading past the clip's last frame keeps producing its final image.
pub struct ClipFrames<'a> {
    clip: &'a VisualClip,
    next: u64,
    state: FrameState,
}

impl ClipFrames<'_> {
    /// Overwrite `out`, which must match the clip canvas, with the next frame.
    pub fn next_into(&mut self, out: &mut FrameRGBA) -> NewsreelResult<()> {
        if out.canvas() != self.clip.canvas {
            return Err(NewsreelError::validation(format!(
                "clip frame buffer is {}x{}, expected {}x{}",
                out.width, out.height, self.clip.canvas.width, self.clip.canvas.height
            )));
        }
        let idx = self.next;
        self.next += 1;

        match (&mut self.state, &self.clip.source) {
            (FrameState::Still, ClipSource::Still { image, zoom }) => {
                let t = self.clip.fps.frames_to_secs(idx);
                still::render_zoomed(image, zoom.scale_at(t), self.clip.background, out);
                Ok(())
            }
            (FrameState::Video(frames), _) => frames.next_into(out),
            (FrameState::Held, ClipSource::Frame(frame)) => {
                out.data.copy_from_slice(&frame.data);
                Ok(())
            }
            _ => Err(NewsreelError::validation("clip frame state does not match its source")),
        }
    }
}

/// Build the clip for `scene`, lasting `duration_secs`.
///
/// Falls back to a placeholder showing the scene's narration when `media` is absent or cannot
/// be used.
pub fn build_visual_clip(
    scene: &Scene,
    duration_secs: f64,
    media: Option<&MediaFile>,
    ctx: &ClipContext,
) -> VisualClip {
    let Some(media) = media else {
        tracing::debug!(scene = scene.scene_number, "no media, using placeholder");
        return placeholder_clip(scene, duration_secs, ctx);
    };

    match media_clip(scene, duration_secs, media, ctx) {
        Ok(clip) => clip,
        Err(e) => {
            tracing::warn!(
                scene = scene.scene_number,
                path = %media.path.display(),
                error = %e,
                "media unusable, using placeholder"
            );
            placeholder_clip(scene, duration_secs, ctx)
        }
    }
}

fn media_clip(
    scene: &Scene,
    duration_secs: f64,
    media: &MediaFile,
    ctx: &ClipContext,
) -> NewsreelResult<VisualClip> {
    if !media.path.is_file() {
        return Err(NewsreelError::media(format!(
            "'{}' does not exist",
            media.path.display()
        )));
    }
    let (source, origin) = match media.kind {
        MediaKind::Image => {
            let image = still::load_still(&media.path, ctx.canvas)?;
            (
                ClipSource::Still {
                    image: Arc::new(image),
                    zoom: ZoomRamp::ken_burns(duration_secs),
                },
                ClipOrigin::Image,
            )
        }
        MediaKind::Video => {
            let plan = video::plan_video(&media.path, duration_secs)?;
            tracing::debug!(
                scene = scene.scene_number,
                source_secs = plan.source_secs,
                fit = ?plan.fit,
                "video clip planned"
            );
            (ClipSource::Video(plan), ClipOrigin::Video)
        }
    };
    Ok(VisualClip {
        scene_number: scene.scene_number,
        duration_secs,
        canvas: ctx.canvas,
        fps: ctx.fps,
        background: ctx.background,
        source,
        origin,
    })
}

/// Placeholder clip for `scene`.
pub fn placeholder_clip(scene: &Scene, duration_secs: f64, ctx: &ClipContext) -> VisualClip {
    let frame = render_placeholder(
        ctx.canvas,
        &scene.display_text(),
        &ctx.placeholder,
        &ctx.placeholder_font,
        &ctx.text,
    );
    let mut clip = VisualClip::held_frame(scene.scene_number, duration_secs, ctx.fps, frame);
    clip.background = ctx.background;
    clip
}

#[cfg(test)]
#[path = "../../tests/unit/clip/mod.rs"]
mod tests;
