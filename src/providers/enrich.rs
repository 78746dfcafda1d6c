use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::foundation::math::truncate_chars;
use crate::providers::SceneEnricher;
use crate::script::model::{MAX_KEYWORD_CHARS, Scene, SceneMediaType, default_mood};

/// Search terms, media preference and tone for one scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneEnrichment {
    /// Stock search keywords, best first.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Preferred media kind.
    #[serde(default)]
    pub media_type: SceneMediaType,
    /// Tone hint.
    #[serde(default = "default_mood")]
    pub mood: String,
}

impl SceneEnrichment {
    /// Enrichment used when the enricher fails: the start of the visual description as the
    /// only keyword, a photo, neutral mood.
    pub fn degraded(scene: &Scene) -> Self {
        let desc = scene.visual_description.trim();
        let keyword = if desc.is_empty() {
            "news"
        } else {
            truncate_chars(desc, MAX_KEYWORD_CHARS)
        };
        Self {
            keywords: vec![keyword.to_string()],
            media_type: SceneMediaType::Photo,
            mood: default_mood(),
        }
    }

    /// Copy of `scene` carrying this enrichment.
    pub fn apply_to(&self, scene: &Scene) -> Scene {
        Scene {
            search_keywords: self.keywords.clone(),
            media_type: self.media_type,
            mood: self.mood.clone(),
            ..scene.clone()
        }
    }
}

/// Parse an enrichment from free-form output that contains a JSON object somewhere.
///
/// The object spans from the first `{` to the last `}`.
pub fn parse_enrichment(output: &str) -> NewsreelResult<SceneEnrichment> {
    let start = output.find('{');
    let end = output.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(NewsreelError::provider("enrichment output holds no JSON object"));
    };
    if end < start {
        return Err(NewsreelError::provider("enrichment output holds no JSON object"));
    }
    serde_json::from_str(&output[start..=end])
        .map_err(|e| NewsreelError::provider(format!("invalid enrichment JSON: {e}")))
}

/// Enrich every scene, in order.
///
/// A failing scene gets [`SceneEnrichment::degraded`] and a warning; the others are unaffected.
pub fn enrich_scenes(scenes: &[Scene], enricher: &dyn SceneEnricher) -> Vec<Scene> {
    scenes
        .iter()
        .map(|scene| {
            let enrichment = enricher.enrich(scene).unwrap_or_else(|e| {
                tracing::warn!(scene = scene.scene_number, error = %e, "scene enrichment failed, using defaults");
                SceneEnrichment::degraded(scene)
            });
            enrichment.apply_to(scene)
        })
        .collect()
}
