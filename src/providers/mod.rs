//! External collaborators: script generation, scene enrichment and media retrieval.
//!
//! The pipeline depends only on the traits below. Concrete adapters talk JSON to configured
//! programs over stdin/stdout, read a media manifest from disk, or synthesize fallback images.

use std::path::Path;

use crate::foundation::error::NewsreelResult;
use crate::script::model::{Article, MediaFile, Scene, Script};

/// Command-line adapters for the three collaborators.
pub mod command;
/// Scene enrichment and its degraded default.
pub mod enrich;
/// Generated gradient stand-in images.
pub mod fallback;
/// Media lists read from disk.
pub mod media;

pub use command::{CommandMediaProvider, CommandSceneEnricher, CommandScriptProvider};
pub use enrich::{SceneEnrichment, enrich_scenes};
pub use fallback::{FallbackMediaProvider, MediaWithFallback};
pub use media::ManifestMediaProvider;

/// Writes a narration script with scenes for an article.
pub trait ScriptProvider: Send + Sync {
    /// Generate the script for `article`.
    fn generate(&self, article: &Article) -> NewsreelResult<Script>;
}

/// Derives stock search terms and a media preference for one scene.
pub trait SceneEnricher: Send + Sync {
    /// Enrichment for `scene`.
    fn enrich(&self, scene: &Scene) -> NewsreelResult<SceneEnrichment>;
}

/// Retrieves media assets for scenes into a directory.
pub trait MediaProvider: Send + Sync {
    /// Fetch media for `scenes`, writing any downloaded or generated files under `out_dir`.
    ///
    /// The result may leave scenes without an entry.
    fn fetch(&self, scenes: &[Scene], out_dir: &Path) -> NewsreelResult<Vec<MediaFile>>;
}
