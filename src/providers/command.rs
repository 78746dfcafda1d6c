use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::CommandTemplate;
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::providers::enrich::{SceneEnrichment, parse_enrichment};
use crate::providers::{MediaProvider, SceneEnricher, ScriptProvider};
use crate::script::load::load_script_json;
use crate::script::model::{Article, MediaFile, MediaKind, Scene, SceneMediaType, Script};

/// Candidates tried per scene before the scene is left without media.
pub const MAX_MEDIA_CANDIDATES: usize = 3;

/// Run `template` with `input` on stdin and return its stdout.
fn run_json_command(
    template: &CommandTemplate,
    vars: &[(&str, &str)],
    input: &[u8],
) -> NewsreelResult<String> {
    if template.program.trim().is_empty() {
        return Err(NewsreelError::provider("provider command is not configured"));
    }
    let mut child = Command::new(&template.program)
        .args(template.render_args(vars))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            NewsreelError::provider(format!("failed to spawn '{}': {e}", template.program))
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        // A command may exit without reading its input; its exit status decides.
        if let Err(e) = stdin.write_all(input) {
            tracing::debug!(program = %template.program, error = %e, "provider closed stdin early");
        }
    }
    let output = child.wait_with_output().map_err(|e| {
        NewsreelError::provider(format!("failed to wait for '{}': {e}", template.program))
    })?;
    if !output.status.success() {
        return Err(NewsreelError::provider(format!(
            "'{}' exited with status {}: {}",
            template.program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    String::from_utf8(output.stdout)
        .map_err(|e| NewsreelError::provider(format!("'{}' wrote non-UTF-8 output: {e}", template.program)))
}

/// Script generation through an external program: article JSON in, script JSON out.
#[derive(Clone, Debug)]
pub struct CommandScriptProvider {
    template: CommandTemplate,
}

impl CommandScriptProvider {
    /// Provider running `template`.
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl ScriptProvider for CommandScriptProvider {
    fn generate(&self, article: &Article) -> NewsreelResult<Script> {
        let input = serde_json::to_vec(article)?;
        let stdout = run_json_command(&self.template, &[], &input)?;
        let script = load_script_json(&stdout)
            .map_err(|e| NewsreelError::provider(format!("script provider output: {e}")))?;
        tracing::info!(scenes = script.scenes.len(), "script generated");
        Ok(script)
    }
}

/// Scene enrichment through an external program: scene JSON in, text containing
/// `{keywords, media_type, mood}` out.
#[derive(Clone, Debug)]
pub struct CommandSceneEnricher {
    template: CommandTemplate,
}

impl CommandSceneEnricher {
    /// Enricher running `template`.
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl SceneEnricher for CommandSceneEnricher {
    fn enrich(&self, scene: &Scene) -> NewsreelResult<SceneEnrichment> {
        let input = serde_json::to_vec(scene)?;
        let stdout = run_json_command(&self.template, &[], &input)?;
        parse_enrichment(&stdout)
    }
}

/// One scene's entry in a media query sent to the media command.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MediaQuery<'a> {
    /// Scene the query is for.
    pub scene_number: u32,
    /// Derived search query.
    pub search_query: String,
    /// Preferred media kind.
    pub media_type: SceneMediaType,
    /// Scene description.
    pub visual_description: &'a str,
}

impl<'a> MediaQuery<'a> {
    /// Query for `scene`.
    pub fn for_scene(scene: &'a Scene) -> Self {
        Self {
            scene_number: scene.scene_number,
            search_query: scene.search_query(),
            media_type: scene.media_type,
            visual_description: &scene.visual_description,
        }
    }
}

/// Media command response entry.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct MediaCandidates {
    /// Scene the candidates belong to.
    pub scene_number: u32,
    /// Kind of every candidate.
    #[serde(rename = "type", default = "default_media_kind")]
    pub kind: MediaKind,
    /// Downloaded files, best first.
    #[serde(default)]
    pub candidates: Vec<PathBuf>,
}

fn default_media_kind() -> MediaKind {
    MediaKind::Image
}

impl MediaCandidates {
    /// First of at most [`MAX_MEDIA_CANDIDATES`] candidates that exists and is non-empty.
    pub fn pick(&self) -> Option<MediaFile> {
        for (attempt, path) in self.candidates.iter().take(MAX_MEDIA_CANDIDATES).enumerate() {
            let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            if size > 0 {
                return Some(MediaFile {
                    scene_number: self.scene_number,
                    path: path.clone(),
                    kind: self.kind,
                });
            }
            tracing::debug!(
                scene = self.scene_number,
                attempt = attempt + 1,
                path = %path.display(),
                "media candidate missing or empty"
            );
        }
        None
    }
}

/// Media retrieval through an external program.
///
/// The program receives a JSON array of [`MediaQuery`] on stdin (and the output directory as
/// `{out}`) and prints a JSON array of [`MediaCandidates`].
#[derive(Clone, Debug)]
pub struct CommandMediaProvider {
    template: CommandTemplate,
}

impl CommandMediaProvider {
    /// Provider running `template`.
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl MediaProvider for CommandMediaProvider {
    fn fetch(&self, scenes: &[Scene], out_dir: &Path) -> NewsreelResult<Vec<MediaFile>> {
        let queries: Vec<MediaQuery<'_>> = scenes.iter().map(MediaQuery::for_scene).collect();
        let input = serde_json::to_vec(&queries)?;
        let out = out_dir.to_string_lossy();
        let stdout = run_json_command(&self.template, &[("out", out.as_ref())], &input)?;
        let entries: Vec<MediaCandidates> = serde_json::from_str(stdout.trim())
            .map_err(|e| NewsreelError::provider(format!("invalid media provider output: {e}")))?;

        let mut media = Vec::new();
        for entry in &entries {
            match entry.pick() {
                Some(file) => media.push(file),
                None => {
                    tracing::warn!(scene = entry.scene_number, "no usable media candidate");
                }
            }
        }
        tracing::info!(found = media.len(), scenes = scenes.len(), "media fetched");
        Ok(media)
    }
}
