//! Entry classification for archive contents
//!
//! Entries are classified purely by file extension, case-insensitively.

use serde::{Deserialize, Serialize};

/// Kind of an archive entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A document the pipeline can parse (PDF)
    Document,
    /// A nested container (ZIP)
    Archive,
    /// Anything else; skipped silently
    #[default]
    Other,
}

impl EntryKind {
    /// Classify a file extension (without the dot).
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Document,
            "zip" => Self::Archive,
            _ => Self::Other,
        }
    }

    /// Classify an entry by the suffix of its name or path.
    ///
    /// A bare `.pdf` or `dir/.zip` still counts; only the text after the
    /// last dot is compared.
    #[must_use]
    pub fn classify(name: &str) -> Self {
        name.rsplit_once('.')
            .map_or(Self::Other, |(_, ext)| Self::from_extension(ext))
    }
}

impl std::fmt::Display for EntryKind {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Document => "document",
            Self::Archive => "archive",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// A document found inside a container.
///
/// `path` is slash-joined and container-relative. Entries from nested
/// containers carry the nested container's own path as a prefix, e.g.
/// `outer/inner.zip/tickets/a.pdf`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Nesting trail plus the entry's path inside its own container
    pub path: String,
    /// File name without directories
    pub name: String,
    /// Entry contents
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Entry classification
    pub kind: EntryKind,
}
