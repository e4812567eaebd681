//! Rendering collaborator interface
//!
//! The pipeline does not parse PDF byte streams itself. A
//! [`DocumentRenderer`] opens the bytes and reports the page count, and the
//! opened [`RenderedDocument`] yields the positioned text fragments of each
//! page in emission order.

use billsplit_core::{BillsplitError, TextFragment};
use thiserror::Error;

/// Errors reported by a rendering collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer itself is not usable (e.g. shared library missing)
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),

    /// The byte stream is not a readable document
    #[error("Failed to open document: {0}")]
    Load(String),

    /// A single page could not be read
    #[error("Failed to read page {page_number}: {reason}")]
    Page {
        /// 1-based page number
        page_number: usize,
        /// Reason reported by the renderer
        reason: String,
    },
}

impl RenderError {
    /// Convert into the pipeline error for the named document.
    #[must_use]
    pub fn into_pipeline_error(self, name: &str) -> BillsplitError {
        match self {
            Self::Page {
                page_number,
                reason,
            } => BillsplitError::PageExtraction {
                page_number,
                reason,
            },
            Self::Unavailable(reason) | Self::Load(reason) => BillsplitError::DocumentLoad {
                name: name.to_string(),
                reason,
            },
        }
    }
}

/// Opens document byte streams.
pub trait DocumentRenderer {
    /// Open a document. The returned handle may borrow both the renderer and
    /// the bytes.
    ///
    /// # Errors
    /// Returns `RenderError::Load` if the bytes are not a readable document.
    fn load<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RenderedDocument + 'a>, RenderError>;
}

/// An opened document.
pub trait RenderedDocument {
    /// Number of pages reported by the renderer.
    fn page_count(&self) -> usize;

    /// Text fragments of a 1-based page, in emission order.
    ///
    /// # Errors
    /// Returns `RenderError::Page` if the page cannot be read.
    fn page_fragments(&self, page_number: usize) -> Result<Vec<TextFragment>, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_maps_to_document_load() {
        let err = RenderError::Load("bad header".to_string()).into_pipeline_error("a.pdf");
        assert!(matches!(err, BillsplitError::DocumentLoad { ref name, .. } if name == "a.pdf"));
    }

    #[test]
    fn test_page_error_maps_to_page_extraction() {
        let err = RenderError::Page {
            page_number: 4,
            reason: "broken content stream".to_string(),
        }
        .into_pipeline_error("a.pdf");
        assert_eq!(
            err.to_string(),
            "Failed to extract page 4: broken content stream"
        );
    }
}
