use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::providers::MediaProvider;
use crate::script::model::{MediaFile, Scene};

/// Read a JSON list of [`MediaFile`]s.
///
/// Relative paths are resolved against the manifest's directory. Duplicate entries for one scene
/// are kept; the first one wins at lookup.
pub fn load_media_manifest(path: &Path) -> NewsreelResult<Vec<MediaFile>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read media manifest '{}'", path.display()))?;
    let mut media: Vec<MediaFile> = serde_json::from_str(&json).map_err(|e| {
        NewsreelError::serde(format!("invalid media manifest '{}': {e}", path.display()))
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for m in &mut media {
        if m.path.is_relative() {
            m.path = base.join(&m.path);
        }
    }
    Ok(media)
}

/// Media from a manifest file prepared ahead of time.
#[derive(Clone, Debug)]
pub struct ManifestMediaProvider {
    path: PathBuf,
}

impl ManifestMediaProvider {
    /// Provider reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MediaProvider for ManifestMediaProvider {
    fn fetch(&self, scenes: &[Scene], _out_dir: &Path) -> NewsreelResult<Vec<MediaFile>> {
        let media = load_media_manifest(&self.path)?;
        let unknown: Vec<u32> = media
            .iter()
            .map(|m| m.scene_number)
            .filter(|n| !scenes.iter().any(|s| s.scene_number == *n))
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(scenes = ?unknown, "media manifest names scenes the script does not have");
        }
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::model::MediaKind;

    #[test]
    fn relative_paths_resolve_next_to_the_manifest() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!("newsreel_manifest_{}_{nanos}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let manifest = dir.join("media.json");
        std::fs::write(
            &manifest,
            r#"[
                {"scene_number": 1, "path": "one.jpg", "type": "image"},
                {"scene_number": 2, "path": "/abs/two.mp4", "type": "video"},
                {"scene_number": 2, "path": "dup.jpg", "type": "image"}
            ]"#,
        )
        .unwrap();

        let media = ManifestMediaProvider::new(&manifest)
            .fetch(&[Scene::new(1, "", ""), Scene::new(2, "", "")], &dir)
            .unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(media.len(), 3);
        assert_eq!(media[0].path, dir.join("one.jpg"));
        assert_eq!(media[1].path, PathBuf::from("/abs/two.mp4"));
        assert_eq!(media[1].kind, MediaKind::Video);
    }

    #[test]
    fn missing_or_invalid_manifest_errors() {
        assert!(load_media_manifest(Path::new("/nonexistent/newsreel/media.json")).is_err());
    }
}
