//! Request orchestration.
//!
//! A [`Renderer`] owns everything that is resolved once at startup (config, voice, fonts,
//! caption renderer) and turns a script plus media into an MP4. A [`Producer`] adds the external
//! collaborators in front of it so an article goes all the way to a video. Every request gets its
//! own [`Workspace`], which is removed when the request ends, successful or not.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::assemble::{AssemblyReport, SequenceFormat, render_to_file};
use crate::caption::{CaptionRenderer, Composite, SvgCaptionRenderer, composite_scene};
use crate::clip::{ClipContext, build_visual_clip};
use crate::config::RenderConfig;
use crate::encode::ensure_parent_dir;
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::providers::{
    CommandMediaProvider, CommandSceneEnricher, CommandScriptProvider, FallbackMediaProvider,
    MediaProvider, MediaWithFallback, SceneEnricher, ScriptProvider, enrich_scenes,
};
use crate::script::load::validate_script;
use crate::script::model::{Article, MediaFile, Scene, Script, duplicate_media_scenes, media_for_scene};
use crate::text::TextEngine;
use crate::timing::{allocate, scene_frame_spans};
use crate::voice::{CommandVoice, NarrationTrack, VoiceSynthesizer, narrate};

static WORKSPACE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Per-request scratch directory, removed on drop unless kept.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    keep: bool,
}

impl Workspace {
    /// Create a fresh directory under `root`, named by process id, time and a sequence number.
    pub fn create(root: &Path, keep: bool) -> NewsreelResult<Self> {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let seq = WORKSPACE_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = root.join(format!("req_{}_{nanos}_{seq}", std::process::id()));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create workspace '{}'", dir.display()))?;
        tracing::debug!(dir = %dir.display(), "workspace created");
        Ok(Self { dir, keep })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.keep {
            tracing::info!(dir = %self.dir.display(), "keeping workspace");
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "failed to remove workspace");
        }
    }
}

/// Result of a successful render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOutput {
    /// The written MP4.
    pub out_path: PathBuf,
    /// Measured narration length in seconds.
    pub narration_secs: f64,
    /// Per-scene layout of the video.
    pub report: AssemblyReport,
}

/// Script-and-media to video renderer.
pub struct Renderer {
    config: RenderConfig,
    voice: Box<dyn VoiceSynthesizer>,
    captions: Option<Arc<dyn CaptionRenderer>>,
    clips: ClipContext,
}

impl Renderer {
    /// Renderer using the configured voice command and system fonts.
    pub fn from_config(config: RenderConfig) -> NewsreelResult<Self> {
        let voice = Box::new(CommandVoice::new(config.voice.clone()));
        Self::new(config, voice)
    }

    /// Renderer with a custom voice, using system fonts plus the configured font files.
    pub fn new(config: RenderConfig, voice: Box<dyn VoiceSynthesizer>) -> NewsreelResult<Self> {
        let text = TextEngine::with_system_fonts(&config.caption.font_files);
        Self::with_text_engine(config, voice, text)
    }

    /// Renderer drawing text with `text`.
    pub fn with_text_engine(
        config: RenderConfig,
        voice: Box<dyn VoiceSynthesizer>,
        text: TextEngine,
    ) -> NewsreelResult<Self> {
        config.validate()?;
        let captions = SvgCaptionRenderer::from_config(&config, &text)
            .map(|r| Arc::new(r) as Arc<dyn CaptionRenderer>);
        let clips = ClipContext::from_config(&config, text);
        Ok(Self {
            config,
            voice,
            captions,
            clips,
        })
    }

    /// Replace the caption renderer; `None` disables captions.
    pub fn with_captions(mut self, captions: Option<Arc<dyn CaptionRenderer>>) -> Self {
        self.captions = captions;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Shared clip building context.
    pub fn clip_context(&self) -> &ClipContext {
        &self.clips
    }

    /// New workspace under the configured temp root.
    pub fn workspace(&self) -> NewsreelResult<Workspace> {
        Workspace::create(&self.config.temp_root, self.config.keep_temp)
    }

    /// Render `script` with `media` into an MP4 at `out`.
    ///
    /// Narration failure and encoding failure are the only errors; every per-scene problem is
    /// absorbed by a fallback. On error no file is left at `out`.
    #[tracing::instrument(skip(self, script, media), fields(scenes = script.scenes.len()))]
    pub fn render(
        &self,
        script: &Script,
        media: &[MediaFile],
        out: &Path,
    ) -> NewsreelResult<RenderOutput> {
        let ws = self.workspace()?;
        self.render_in(&ws, script, media, out)
    }

    fn render_in(
        &self,
        ws: &Workspace,
        script: &Script,
        media: &[MediaFile],
        out: &Path,
    ) -> NewsreelResult<RenderOutput> {
        validate_script(script)?;
        let narration: NarrationTrack = narrate(self.voice.as_ref(), &script.script_text, ws.path())?;

        let durations = allocate(narration.duration_secs, &script.scenes, self.config.allocation);
        let spans = scene_frame_spans(&durations, self.config.fps)?;
        tracing::info!(
            narration_secs = narration.duration_secs,
            frames = spans.last().map(|s| s.end.0).unwrap_or(0),
            "scene timing allocated"
        );

        let dups = duplicate_media_scenes(media);
        if !dups.is_empty() {
            tracing::warn!(scenes = ?dups, "several media files for some scenes, using the first");
        }

        let composites = self.build_composites(&script.scenes, &durations, media);
        let format = SequenceFormat {
            canvas: self.config.canvas,
            fps: self.config.fps,
        };
        ensure_parent_dir(out)?;
        let report = render_to_file(&composites, &spans, format, &narration.path, out)?;
        tracing::info!(out = %out.display(), "video written");

        Ok(RenderOutput {
            out_path: out.to_path_buf(),
            narration_secs: narration.duration_secs,
            report,
        })
    }

    /// Clip plus caption for every scene, in scene order.
    ///
    /// `durations[i]` is the length of `scenes[i]`. Scenes are built on the rayon pool when
    /// `parallel_scenes` is set; the result order is the same either way.
    pub fn build_composites(
        &self,
        scenes: &[Scene],
        durations: &[f64],
        media: &[MediaFile],
    ) -> Vec<Composite> {
        let captions = self.captions.as_deref();
        let build = |(scene, &duration): (&Scene, &f64)| {
            let clip = build_visual_clip(
                scene,
                duration,
                media_for_scene(media, scene.scene_number),
                &self.clips,
            );
            composite_scene(clip, &scene.narration, captions)
        };
        if self.config.parallel_scenes {
            scenes.par_iter().zip(durations.par_iter()).map(build).collect()
        } else {
            scenes.iter().zip(durations).map(build).collect()
        }
    }
}

/// Article to video: script generation, enrichment and media retrieval in front of a
/// [`Renderer`].
pub struct Producer {
    renderer: Renderer,
    script: Box<dyn ScriptProvider>,
    enricher: Option<Box<dyn SceneEnricher>>,
    media: Box<dyn MediaProvider>,
}

impl Producer {
    /// Producer from explicit collaborators.
    pub fn new(
        renderer: Renderer,
        script: Box<dyn ScriptProvider>,
        enricher: Option<Box<dyn SceneEnricher>>,
        media: Box<dyn MediaProvider>,
    ) -> Self {
        Self {
            renderer,
            script,
            enricher,
            media,
        }
    }

    /// Producer wired to the configured provider commands.
    ///
    /// A script command is required. Without an enrichment command scenes keep the keywords the
    /// script came with; without a media command every scene gets a generated image.
    pub fn from_config(renderer: Renderer) -> NewsreelResult<Self> {
        let cfg = renderer.config().providers.clone();
        let script_cmd = cfg
            .script
            .ok_or_else(|| NewsreelError::validation("providers.script is not configured"))?;
        let fallback =
            FallbackMediaProvider::from_config(renderer.config(), renderer.clip_context().text.clone());
        let media: Box<dyn MediaProvider> = match cfg.media {
            Some(cmd) => Box::new(MediaWithFallback::new(
                Box::new(CommandMediaProvider::new(cmd)),
                fallback,
            )),
            None => {
                tracing::info!("no media command configured, using generated images");
                Box::new(fallback)
            }
        };
        let enricher = cfg
            .enrich
            .map(|cmd| Box::new(CommandSceneEnricher::new(cmd)) as Box<dyn SceneEnricher>);
        Ok(Self::new(
            renderer,
            Box::new(CommandScriptProvider::new(script_cmd)),
            enricher,
            media,
        ))
    }

    /// The renderer behind this producer.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Produce a video for `article` at `out`.
    ///
    /// Script generation failure is fatal. Enrichment and provider-level media failures degrade
    /// to defaults and generated images; a fatal media error (see
    /// [`NewsreelError::is_fatal`]) aborts the request.
    #[tracing::instrument(skip(self, article), fields(title = %article.title))]
    pub fn produce(&self, article: &Article, out: &Path) -> NewsreelResult<RenderOutput> {
        let ws = self.renderer.workspace()?;
        let script = self.script.generate(article)?;
        validate_script(&script)?;

        let scenes = match &self.enricher {
            Some(enricher) => enrich_scenes(&script.scenes, enricher.as_ref()),
            None => script.scenes.clone(),
        };
        let script = Script { scenes, ..script };

        let media = match self.media.fetch(&script.scenes, ws.path()) {
            Ok(media) => media,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "media retrieval failed, every scene uses a placeholder");
                Vec::new()
            }
        };
        tracing::info!(scenes = script.scenes.len(), media = media.len(), "inputs ready");
        self.renderer.render_in(&ws, &script, &media, out)
    }
}
