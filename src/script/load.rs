use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::script::model::{Scene, SceneMediaType, Script, default_mood};

/// Wire form of a script document; scene numbers may be missing.
#[derive(serde::Deserialize)]
struct ScriptDoc {
    #[serde(default)]
    script_text: String,
    #[serde(default)]
    scenes: Vec<SceneDoc>,
    #[serde(default)]
    total_duration: f64,
}

#[derive(serde::Deserialize)]
struct SceneDoc {
    scene_number: Option<u32>,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    narration: String,
    #[serde(default)]
    visual_description: String,
    #[serde(default)]
    search_keywords: Vec<String>,
    #[serde(default)]
    media_type: SceneMediaType,
    #[serde(default = "default_mood")]
    mood: String,
}

/// Parse and validate a script JSON document.
///
/// Scenes without a `scene_number` get their 1-based position. That assigned number must not
/// be one another scene states explicitly: `[{"scene_number": 2}, {}]` is rejected as a clash on
/// the second scene's assigned 2. A document with no scenes, a zero scene number, or a repeated
/// scene number is rejected as well.
pub fn load_script_json(json: &str) -> NewsreelResult<Script> {
    let doc: ScriptDoc = serde_json::from_str(json)
        .map_err(|e| NewsreelError::serde(format!("failed to parse script JSON: {e}")))?;

    let explicit: std::collections::BTreeSet<u32> =
        doc.scenes.iter().filter_map(|s| s.scene_number).collect();
    for (idx, s) in doc.scenes.iter().enumerate() {
        let assigned = idx as u32 + 1;
        if s.scene_number.is_none() && explicit.contains(&assigned) {
            return Err(NewsreelError::validation(format!(
                "scene at position {assigned} has no scene_number and its assigned number \
                 {assigned} is already used by another scene"
            )));
        }
    }

    let scenes = doc
        .scenes
        .into_iter()
        .enumerate()
        .map(|(idx, s)| Scene {
            scene_number: s.scene_number.unwrap_or(idx as u32 + 1),
            duration: s.duration,
            narration: s.narration,
            visual_description: s.visual_description,
            search_keywords: s.search_keywords,
            media_type: s.media_type,
            mood: s.mood,
        })
        .collect();

    let script = Script {
        script_text: doc.script_text,
        scenes,
        total_duration: doc.total_duration,
    };
    validate_script(&script)?;
    Ok(script)
}

/// Read and parse a script JSON file.
pub fn load_script_file(path: &Path) -> NewsreelResult<Script> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read script '{}'", path.display()))?;
    load_script_json(&json)
}

/// Check the scene list invariants of a [`Script`].
pub fn validate_script(script: &Script) -> NewsreelResult<()> {
    if script.scenes.is_empty() {
        return Err(NewsreelError::validation("no scenes in script"));
    }

    let mut seen = std::collections::BTreeSet::new();
    for scene in &script.scenes {
        if scene.scene_number == 0 {
            return Err(NewsreelError::validation("scene numbers are 1-based"));
        }
        if !seen.insert(scene.scene_number) {
            return Err(NewsreelError::validation(format!(
                "duplicate scene_number {}",
                scene.scene_number
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_scene_numbers_follow_position() {
        let script = load_script_json(
            r#"{
                "script_text": "One. Two.",
                "scenes": [
                    {"narration": "One.", "visual_description": "a"},
                    {"narration": "Two.", "visual_description": "b"}
                ],
                "total_duration": 20
            }"#,
        )
        .unwrap();
        let numbers: Vec<u32> = script.scenes.iter().map(|s| s.scene_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(script.total_duration, 20.0);
    }

    #[test]
    fn empty_scene_list_is_rejected() {
        let err = load_script_json(r#"{"script_text": "x", "scenes": []}"#).unwrap_err();
        assert!(err.to_string().contains("no scenes"));
    }

    #[test]
    fn duplicate_scene_numbers_are_rejected() {
        let err = load_script_json(
            r#"{"script_text": "x", "scenes": [{"scene_number": 1}, {"scene_number": 1}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, NewsreelError::Validation(_)));
    }

    #[test]
    fn assigned_number_clashing_with_explicit_one_is_named() {
        let err = load_script_json(r#"{"script_text": "x", "scenes": [{"scene_number": 2}, {}]}"#)
            .unwrap_err();
        assert!(matches!(err, NewsreelError::Validation(_)));
        let msg = err.to_string();
        assert!(msg.contains("position 2"), "{msg}");
        assert!(msg.contains("assigned number 2"), "{msg}");

        // Explicit numbers that leave the positions free are fine.
        let script =
            load_script_json(r#"{"script_text": "x", "scenes": [{"scene_number": 5}, {}]}"#).unwrap();
        let numbers: Vec<u32> = script.scenes.iter().map(|s| s.scene_number).collect();
        assert_eq!(numbers, vec![5, 2]);
    }

    #[test]
    fn malformed_json_is_a_serde_error() {
        let err = load_script_json("{not json").unwrap_err();
        assert!(matches!(err, NewsreelError::Serde(_)));
    }
}
