//! Archive support for billsplit
//!
//! This crate finds documents inside ZIP archives and packages renamed
//! documents into a fresh ZIP.
//!
//! # Features
//!
//! - **Recursive traversal**: nested ZIPs are opened up to a depth bound
//! - **Path trails**: nested entries keep their container's path as a prefix
//! - **Subtree isolation**: a corrupt nested archive drops only its own contents
//! - **Output packaging**: DEFLATE level 6, input order kept, duplicate names numbered
//!
//! # Usage
//!
//! ## Find every PDF in an archive
//!
//! ```no_run
//! use billsplit_archive::{walk_archive, WalkOptions};
//! use billsplit_core::discard;
//!
//! let bytes = std::fs::read("tickets.zip").unwrap();
//! let walk = walk_archive(&bytes, &WalkOptions::default(), &discard).unwrap();
//! for entry in &walk.entries {
//!     println!("{} ({} bytes)", entry.path, entry.bytes.len());
//! }
//! ```
//!
//! ## Package renamed documents
//!
//! ```no_run
//! use billsplit_archive::build_archive;
//!
//! let out = build_archive([(b"%PDF".to_vec(), Some("张三_1.pdf".to_string()))]).unwrap();
//! std::fs::write("renamed_files.zip", out).unwrap();
//! ```

pub mod builder;
pub mod error;
pub mod walker;

// =============================================================================
// Archive Constants
// =============================================================================

/// Maximum size for a single file within an archive (100 MB).
///
/// Larger entries are skipped with a warning.
pub const MAX_FILE_SIZE: u64 = 100_000_000;

/// Default deepest nesting level that is still opened.
///
/// The top-level archive is depth 0, so the default allows three levels of
/// ZIP-within-ZIP below it.
pub const DEFAULT_MAX_DEPTH: usize = 3;

pub use builder::{build_archive, ArchiveBuilder, COMPRESSION_LEVEL};
pub use error::ArchiveError;
pub use walker::{walk_archive, walk_archive_from_path, ArchiveWalk, SubtreeFailure, WalkOptions};
