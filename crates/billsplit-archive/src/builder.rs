//! Packaging renamed documents into an output ZIP

use crate::error::ArchiveError;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

/// Deflate level used for output archives.
pub const COMPRESSION_LEVEL: i64 = 6;

/// Incremental writer for the output archive.
///
/// Entries are written in the order they are added. Items without a usable
/// target name are skipped. A name that was already written gets a numeric
/// suffix before its extension (`a.pdf`, `a (2).pdf`, `a (3).pdf`), since a
/// ZIP archive cannot hold two entries with the same name.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    used_names: HashSet<String>,
    written: usize,
}

impl std::fmt::Debug for ArchiveBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveBuilder")
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

impl Default for ArchiveBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL))
            .last_modified_time(DateTime::default());
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options,
            used_names: HashSet::new(),
            written: 0,
        }
    }

    /// Number of entries written so far.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.written
    }

    /// Whether nothing has been written yet.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Add one item. Returns the entry name actually written, or `None` when
    /// the item was skipped for lacking a target name.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError` if the entry cannot be written.
    pub fn add(&mut self, bytes: &[u8], target_name: Option<&str>) -> Result<Option<String>, ArchiveError> {
        let Some(target) = target_name.map(str::trim).filter(|name| !name.is_empty()) else {
            warn!("Skipping output item without a target name ({} bytes)", bytes.len());
            return Ok(None);
        };

        let name = self.unique_name(target);
        debug!("Writing {name} ({} bytes)", bytes.len());
        self.writer.start_file(name.as_str(), self.options)?;
        self.writer.write_all(bytes)?;
        self.used_names.insert(name.clone());
        self.written += 1;
        Ok(Some(name))
    }

    /// Finish the archive and return its bytes.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError` if the central directory cannot be written.
    pub fn finish(self) -> Result<Vec<u8>, ArchiveError> {
        let written = self.written;
        let bytes = self.writer.finish()?.into_inner();
        info!("Built output archive: {written} entries, {} bytes", bytes.len());
        Ok(bytes)
    }

    fn unique_name(&self, target: &str) -> String {
        if !self.used_names.contains(target) {
            return target.to_string();
        }
        let (stem, ext) = match target.rfind('.') {
            Some(idx) if idx > 0 => (&target[..idx], &target[idx..]),
            _ => (target, ""),
        };
        (2..)
            .map(|n| format!("{stem} ({n}){ext}"))
            .find(|candidate| !self.used_names.contains(candidate))
            .unwrap_or_else(|| target.to_string())
    }
}

/// Build a ZIP archive from `(bytes, target name)` pairs.
///
/// Pairs without a target name are skipped; the rest are written in input
/// order with DEFLATE at level [`COMPRESSION_LEVEL`].
///
/// # Errors
///
/// Returns `ArchiveError` if writing any entry fails.
///
/// # Examples
///
/// ```rust
/// use billsplit_archive::build_archive;
///
/// let bytes = build_archive([
///     (b"%PDF-a".to_vec(), Some("张三_1.pdf".to_string())),
///     (b"%PDF-b".to_vec(), None),
/// ])
/// .unwrap();
/// assert!(!bytes.is_empty());
/// ```
pub fn build_archive<I>(items: I) -> Result<Vec<u8>, ArchiveError>
where
    I: IntoIterator<Item = (Vec<u8>, Option<String>)>,
{
    let mut builder = ArchiveBuilder::new();
    for (bytes, target_name) in items {
        builder.add(&bytes, target_name.as_deref())?;
    }
    builder.finish()
}
