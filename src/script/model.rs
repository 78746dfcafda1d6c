use std::path::PathBuf;

/// Source article a script is written from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Article {
    /// Headline.
    pub title: String,
    /// Short summary.
    #[serde(default)]
    pub description: String,
    /// Body text, may be empty.
    #[serde(default)]
    pub content: String,
}

/// Voiceover script with its ordered scene list.
///
/// Produced once per request and not mutated afterwards; scene enrichment returns new [`Scene`]
/// values instead of editing these.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Script {
    /// Full narration text fed to the voice synthesizer.
    pub script_text: String,
    /// Scenes in order of appearance.
    pub scenes: Vec<Scene>,
    /// Advisory total length in seconds, superseded by the narration duration.
    #[serde(default)]
    pub total_duration: f64,
}

/// One timed segment of the output video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// 1-based, unique within a script.
    pub scene_number: u32,
    /// Advisory duration; the timing allocator decides the real one.
    #[serde(default)]
    pub duration: f64,
    /// Line spoken during this scene, also used as the caption.
    #[serde(default)]
    pub narration: String,
    /// What should be on screen.
    #[serde(default)]
    pub visual_description: String,
    /// Stock search terms, filled by scene enrichment.
    #[serde(default)]
    pub search_keywords: Vec<String>,
    /// Preferred media kind, filled by scene enrichment.
    #[serde(default)]
    pub media_type: SceneMediaType,
    /// Tone hint, filled by scene enrichment.
    #[serde(default = "default_mood")]
    pub mood: String,
}

pub(crate) fn default_mood() -> String {
    "neutral".to_string()
}

/// Longest keyword still considered a real search term.
pub const MAX_KEYWORD_CHARS: usize = 30;

impl Scene {
    /// Create a bare scene with no enrichment.
    pub fn new(
        scene_number: u32,
        narration: impl Into<String>,
        visual_description: impl Into<String>,
    ) -> Self {
        Self {
            scene_number,
            duration: 0.0,
            narration: narration.into(),
            visual_description: visual_description.into(),
            search_keywords: Vec::new(),
            media_type: SceneMediaType::Photo,
            mood: default_mood(),
        }
    }

    /// Stock search query for this scene.
    ///
    /// Uses up to the first three keywords, dropping any longer than [`MAX_KEYWORD_CHARS`]
    /// (those are usually a truncated description, not a term). With nothing left, the first
    /// three words of the visual description stand in.
    pub fn search_query(&self) -> String {
        let terms: Vec<&str> = self
            .search_keywords
            .iter()
            .take(3)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty() && k.chars().count() <= MAX_KEYWORD_CHARS)
            .collect();
        if !terms.is_empty() {
            return terms.join(" ");
        }

        let desc = if self.visual_description.trim().is_empty() {
            "business news"
        } else {
            self.visual_description.as_str()
        };
        desc.split_whitespace().take(3).collect::<Vec<_>>().join(" ")
    }

    /// Narration text, or `Scene N` when the scene has none.
    pub fn display_text(&self) -> String {
        if self.narration.trim().is_empty() {
            format!("Scene {}", self.scene_number)
        } else {
            self.narration.clone()
        }
    }
}

/// Media kind a scene asks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SceneMediaType {
    /// Still photo.
    #[default]
    Photo,
    /// Moving footage.
    Video,
}

impl From<String> for SceneMediaType {
    fn from(s: String) -> Self {
        if s.trim().eq_ignore_ascii_case("video") {
            Self::Video
        } else {
            Self::Photo
        }
    }
}

impl From<SceneMediaType> for String {
    fn from(t: SceneMediaType) -> Self {
        match t {
            SceneMediaType::Photo => "photo".to_string(),
            SceneMediaType::Video => "video".to_string(),
        }
    }
}

/// Downloaded or generated asset for one scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaFile {
    /// Scene this asset belongs to.
    pub scene_number: u32,
    /// Location on disk.
    pub path: PathBuf,
    /// Declared asset kind.
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// Declared kind of a [`MediaFile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image (anything the `image` crate decodes).
    Image,
    /// Video container readable by `ffmpeg`.
    Video,
}

/// First media file matching `scene_number`, if any.
pub fn media_for_scene(media: &[MediaFile], scene_number: u32) -> Option<&MediaFile> {
    media.iter().find(|m| m.scene_number == scene_number)
}

/// Scene numbers that appear more than once in `media`, sorted and deduplicated.
pub fn duplicate_media_scenes(media: &[MediaFile]) -> Vec<u32> {
    let mut seen = std::collections::BTreeSet::new();
    let mut dups = std::collections::BTreeSet::new();
    for m in media {
        if !seen.insert(m.scene_number) {
            dups.insert(m.scene_number);
        }
    }
    dups.into_iter().collect()
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;
