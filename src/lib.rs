//! Newsreel turns a news script into a narrated video.
//!
//! The pipeline is:
//!
//! - synthesize the narration and measure it ([`voice`])
//! - split the narration length across scenes ([`timing`])
//! - build one visual clip per scene from its image, video or a placeholder ([`clip`])
//! - lay the scene's narration over it as a caption ([`caption`])
//! - concatenate everything with the narration into an MP4 ([`assemble`])
//!
//! [`Renderer`] drives these steps for a ready script; [`Producer`] puts script generation,
//! scene enrichment and media retrieval ([`providers`]) in front of it.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Core value types, the crate error and pixel math.
pub mod foundation;

/// Sequence assembler.
pub mod assemble;
/// Caption compositor.
pub mod caption;
/// Visual clip builder.
pub mod clip;
/// Render configuration.
pub mod config;
/// Frame sinks.
pub mod encode;
/// Request orchestration.
pub mod pipeline;
/// Media inspection through `ffprobe`.
pub mod probe;
/// External collaborators.
pub mod providers;
/// Frame buffers.
pub mod render;
/// Script data model and loading.
pub mod script;
/// Font chain and text rasterization.
pub mod text;
/// Scene timing allocation.
pub mod timing;
/// Narration synthesis.
pub mod voice;

pub use crate::assemble::{AssemblyReport, SceneSegment, SequenceFormat, assemble_sequence};
pub use crate::caption::{CaptionRenderer, Composite, SvgCaptionRenderer, composite_scene};
pub use crate::clip::{ClipContext, ClipOrigin, VisualClip, build_visual_clip};
pub use crate::config::RenderConfig;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rgb8};
pub use crate::foundation::error::{NewsreelError, NewsreelResult};
pub use crate::pipeline::{Producer, RenderOutput, Renderer, Workspace};
pub use crate::script::model::{Article, MediaFile, MediaKind, Scene, SceneMediaType, Script};
pub use crate::timing::{AllocationPolicy, allocate, duration_per_scene, scene_frame_spans};
pub use crate::voice::{NarrationTrack, VoiceSynthesizer};
