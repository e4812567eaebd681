//! Error types for the billsplit pipeline.
//!
//! Only document-level failures surface as errors. Page failures, archive
//! subtree failures and missing entities are absorbed by the pipeline and
//! reported through [`crate::event::PipelineEvent`] instead.

use thiserror::Error;

/// Errors that can occur while processing documents.
///
/// # Examples
///
/// ```rust
/// use billsplit_core::BillsplitError;
///
/// let err = BillsplitError::DocumentLoad {
///     name: "ticket.pdf".to_string(),
///     reason: "not a PDF stream".to_string(),
/// };
/// assert_eq!(err.to_string(), "Failed to load document 'ticket.pdf': not a PDF stream");
/// ```
#[derive(Error, Debug)]
pub enum BillsplitError {
    /// The root byte stream of a document could not be opened.
    ///
    /// Fatal for that document only; a batch keeps going.
    #[error("Failed to load document '{name}': {reason}")]
    DocumentLoad {
        /// Document name as supplied by the caller
        name: String,
        /// Reason reported by the rendering collaborator
        reason: String,
    },

    /// The text fragments of a single page could not be retrieved.
    #[error("Failed to extract page {page_number}: {reason}")]
    PageExtraction {
        /// 1-based page number
        page_number: usize,
        /// Reason reported by the rendering collaborator
        reason: String,
    },

    /// A container (top-level or nested) could not be opened.
    #[error("Failed to open archive '{path}': {reason}")]
    ArchiveOpen {
        /// Container path, `<root>` for the top-level buffer
        path: String,
        /// Underlying archive error
        reason: String,
    },

    /// The output container could not be written.
    #[error("Failed to build archive: {0}")]
    ArchiveBuild(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for billsplit operations.
pub type Result<T> = std::result::Result<T, BillsplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_extraction_display() {
        let error = BillsplitError::PageExtraction {
            page_number: 3,
            reason: "no text layer".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to extract page 3: no text layer");
    }

    #[test]
    fn test_archive_open_display() {
        let error = BillsplitError::ArchiveOpen {
            path: "batch/inner.zip".to_string(),
            reason: "invalid Zip archive".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("batch/inner.zip"));
        assert!(display.contains("invalid Zip archive"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BillsplitError = io_err.into();

        match err {
            BillsplitError::IoError(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("Expected IoError variant, got {other:?}"),
        }
    }
}
