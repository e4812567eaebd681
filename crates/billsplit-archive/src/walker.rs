//! Recursive discovery of documents inside ZIP archives
//!
//! The walker opens a container, enumerates entries in container order and
//! classifies each by extension. Documents are collected, nested archives
//! are opened recursively up to a depth bound, everything else is skipped.

use crate::error::ArchiveError;
use billsplit_core::{discard, ArchiveEntry, EntryKind, EventSink, PipelineEvent, Total};
use log::{debug, info, warn};
use std::io::{Cursor, Read};
use std::path::{Component, Path};
use zip::ZipArchive;

use crate::{DEFAULT_MAX_DEPTH, MAX_FILE_SIZE};

/// Options for [`walk_archive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WalkOptions {
    /// Deepest nesting level that is still opened; the top-level archive is depth 0
    pub max_depth: usize,
    /// Entries larger than this are skipped
    pub max_file_size: u64,
}

impl WalkOptions {
    /// Set the maximum nesting depth
    #[inline]
    #[must_use = "returns options with maximum depth configured"]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the per-entry size limit
    #[inline]
    #[must_use = "returns options with file size limit configured"]
    pub const fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }
}

impl Default for WalkOptions {
    #[inline]
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

/// A nested container that could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SubtreeFailure {
    /// Path of the nested archive
    pub path: String,
    /// Error message
    pub reason: String,
}

/// Result of walking an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveWalk {
    /// Document entries from every depth, in container order
    pub entries: Vec<ArchiveEntry>,
    /// Nested archives that failed to open; their contents are absent
    pub failures: Vec<SubtreeFailure>,
    /// Nested archives skipped for exceeding the depth limit
    pub skipped_too_deep: Vec<String>,
    /// Number of non-directory entries seen at any depth
    pub processed: usize,
}

/// Sanitize a path to prevent path traversal attacks (e.g., ../../../etc/passwd)
///
/// Parent references, current-directory references, roots and drive
/// prefixes are dropped. The remaining components are joined with `/`.
///
/// Returns None if the path is entirely invalid (e.g., just "..")
#[inline]
fn sanitize_path(path: &str) -> Option<String> {
    let parts: Vec<String> = Path::new(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Per-call traversal state.
struct Walker<'a> {
    options: WalkOptions,
    sink: &'a dyn EventSink,
    walk: ArchiveWalk,
}

impl Walker<'_> {
    /// Walk one container. Entries are only merged into the result if the whole
    /// container (including its own nested failures, which are absorbed) is read.
    fn walk_container(
        &mut self,
        bytes: &[u8],
        prefix: &str,
        depth: usize,
    ) -> Result<Vec<ArchiveEntry>, ArchiveError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut found = Vec::new();

        for i in 0..archive.len() {
            let (raw_name, size, kind, contents) = {
                // Encrypted entries fail here with a password error
                let mut zip_file = archive.by_index(i).map_err(ArchiveError::from_zip)?;

                // Skip directories
                if zip_file.is_dir() {
                    continue;
                }

                let raw_name = zip_file.name().to_string();
                let size = zip_file.size();
                let kind = EntryKind::classify(&raw_name);

                let contents = if kind == EntryKind::Other || size > self.options.max_file_size {
                    None
                } else {
                    // size <= max_file_size, so the cast cannot truncate on supported targets
                    let mut contents = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
                    zip_file.read_to_end(&mut contents)?;
                    Some(contents)
                };
                (raw_name, size, kind, contents)
            };

            // SECURITY: Sanitize path to prevent path traversal attacks
            let Some(entry_path) = sanitize_path(&raw_name) else {
                warn!("Skipping invalid path: {raw_name} (path traversal attempt or empty)");
                continue;
            };
            let full_path = format!("{prefix}{entry_path}");

            self.walk.processed += 1;
            self.sink.emit(&PipelineEvent::ArchiveEntry {
                current: self.walk.processed,
                total: Total::Indeterminate,
                path: full_path.clone(),
            });

            if kind == EntryKind::Other {
                debug!("Skipping non-document entry: {full_path}");
                continue;
            }

            let Some(contents) = contents else {
                warn!(
                    "Skipping large file: {full_path} ({size} bytes exceeds {} bytes limit)",
                    self.options.max_file_size
                );
                continue;
            };

            match kind {
                EntryKind::Archive => {
                    let nested_depth = depth + 1;
                    if nested_depth > self.options.max_depth {
                        warn!(
                            "Skipping nested archive {full_path}: depth {nested_depth} exceeds max {}",
                            self.options.max_depth
                        );
                        self.sink.emit(&PipelineEvent::NestedArchiveSkipped {
                            path: full_path.clone(),
                            depth: nested_depth,
                            max_depth: self.options.max_depth,
                        });
                        self.walk.skipped_too_deep.push(full_path);
                        continue;
                    }

                    debug!("Opening nested archive: {full_path}");
                    let nested_prefix = format!("{full_path}/");
                    match self.walk_container(&contents, &nested_prefix, nested_depth) {
                        Ok(nested) => found.extend(nested),
                        Err(e) => {
                            warn!("Failed to open nested archive {full_path}: {e}");
                            self.sink.emit(&PipelineEvent::ArchiveOpenFailed {
                                path: full_path.clone(),
                                reason: e.to_string(),
                            });
                            self.walk.failures.push(SubtreeFailure {
                                path: full_path,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                EntryKind::Document => {
                    debug!("Found document: {full_path}");
                    let name = entry_path
                        .rsplit('/')
                        .next()
                        .unwrap_or(entry_path.as_str())
                        .to_string();
                    found.push(ArchiveEntry {
                        path: full_path,
                        name,
                        bytes: contents,
                        kind,
                    });
                }
                EntryKind::Other => {}
            }
        }

        Ok(found)
    }
}

/// Collect every document in a ZIP buffer, descending into nested ZIPs.
///
/// Nested archives deeper than `options.max_depth` are skipped and reported.
/// A nested archive that cannot be read drops only its own subtree; the
/// failure is recorded in [`ArchiveWalk::failures`] and traversal continues
/// with its siblings. Only a failure to read the top-level buffer is an error.
///
/// # Errors
///
/// Returns `ArchiveError` if the top-level buffer is not a readable ZIP
/// archive, or one of its entries is encrypted or corrupt.
///
/// # Examples
///
/// ```no_run
/// use billsplit_archive::{walk_archive, WalkOptions};
/// use billsplit_core::discard;
///
/// let bytes = std::fs::read("tickets.zip").unwrap();
/// let walk = walk_archive(&bytes, &WalkOptions::default(), &discard).unwrap();
/// for entry in walk.entries {
///     println!("{} ({} bytes)", entry.path, entry.bytes.len());
/// }
/// ```
#[must_use = "this function returns extracted documents that should be processed"]
pub fn walk_archive(
    bytes: &[u8],
    options: &WalkOptions,
    sink: &dyn EventSink,
) -> Result<ArchiveWalk, ArchiveError> {
    let mut walker = Walker {
        options: *options,
        sink,
        walk: ArchiveWalk::default(),
    };
    let entries = walker.walk_container(bytes, "", 0)?;
    walker.walk.entries = entries;
    info!(
        "Found {} documents in archive ({} entries processed)",
        walker.walk.entries.len(),
        walker.walk.processed
    );
    Ok(walker.walk)
}

/// Read a ZIP file from disk and walk it.
///
/// # Errors
///
/// Returns `ArchiveError` if the file cannot be read or is not a valid archive.
#[must_use = "this function returns extracted documents that should be processed"]
pub fn walk_archive_from_path(path: &Path, options: &WalkOptions) -> Result<ArchiveWalk, ArchiveError> {
    let bytes = std::fs::read(path)?;
    walk_archive(&bytes, options, &discard)
}
