//! Font resolution and text rasterization.
//!
//! Text goes through a fallback chain: the first configured family that the font database can
//! resolve is used for vector text (laid out and rasterized through `usvg`/`resvg`); when none
//! resolves, callers fall back to the built-in [`bitmap`] font.

use std::path::PathBuf;
use std::sync::Arc;

use usvg::fontdb;

/// Built-in 5x7 bitmap font, the last link of the font chain.
pub mod bitmap;
/// Vector text layout and rasterization through `usvg`/`resvg`.
pub mod vector;

pub use vector::{TextBacking, TextBlock, TextStyle, escape_xml};

/// Outcome of resolving a font family preference list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontChoice {
    /// A concrete family present in the font database.
    Vector {
        /// Family name as reported by the font face.
        family: String,
    },
    /// No configured family is available; use [`bitmap`].
    Bitmap,
}

impl FontChoice {
    /// Family name for vector text, if any.
    pub fn family(&self) -> Option<&str> {
        match self {
            Self::Vector { family } => Some(family),
            Self::Bitmap => None,
        }
    }
}

/// Shared font database plus text helpers built on it.
///
/// Loading system fonts is slow, so one engine is built at startup and shared (it is `Sync`)
/// across scene workers.
#[derive(Clone)]
pub struct TextEngine {
    fontdb: Arc<fontdb::Database>,
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl TextEngine {
    /// Engine with system fonts plus `font_files`. Unreadable font files are skipped with a
    /// warning.
    pub fn with_system_fonts(font_files: &[PathBuf]) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for path in font_files {
            if let Err(e) = db.load_font_file(path) {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font file");
            }
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// Engine with an empty font database; every resolution yields [`FontChoice::Bitmap`].
    pub fn without_fonts() -> Self {
        Self {
            fontdb: Arc::new(fontdb::Database::new()),
        }
    }

    /// Number of loaded font faces.
    pub fn face_count(&self) -> usize {
        self.fontdb.len()
    }

    /// Resolve the first available family from `preferred`.
    ///
    /// The generic names `serif`, `sans-serif` and `monospace` map to the database's generic
    /// families.
    pub fn resolve(&self, preferred: &[String]) -> FontChoice {
        for name in preferred {
            let family = match name.trim().to_ascii_lowercase().as_str() {
                "serif" => fontdb::Family::Serif,
                "sans-serif" => fontdb::Family::SansSerif,
                "monospace" => fontdb::Family::Monospace,
                _ => fontdb::Family::Name(name.trim()),
            };
            let families = [family];
            let query = fontdb::Query {
                families: &families,
                ..fontdb::Query::default()
            };
            let Some(id) = self.fontdb.query(&query) else {
                continue;
            };
            if let Some((resolved, _)) = self.fontdb.face(id).and_then(|f| f.families.first()) {
                return FontChoice::Vector {
                    family: resolved.clone(),
                };
            }
        }
        FontChoice::Bitmap
    }

    pub(crate) fn fontdb(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.fontdb)
    }
}

/// Greedy word wrap using a width function; words wider than `max_width` get a line of their own.
pub(crate) fn wrap_words<F>(text: &str, max_width: f32, mut width_of: F) -> Vec<String>
where
    F: FnMut(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if width_of(&candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
