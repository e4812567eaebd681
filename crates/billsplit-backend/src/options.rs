//! Pipeline options

use serde::{Deserialize, Serialize};

/// Options for document processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Insert the visible page-break marker between pages in `full_text`
    ///
    /// When disabled, pages are still separated by a blank line.
    pub include_separator: bool,

    /// Maximum pages to process (None = all)
    pub max_pages: Option<usize>,

    /// Emit per-fragment diagnostics
    ///
    /// Fragments are logged at debug level and delivered as
    /// `PipelineEvent::Fragment`. Results are unaffected.
    pub debug_mode: bool,
}

impl PipelineOptions {
    /// Set whether the visible page separator is used
    #[inline]
    #[must_use = "returns options with separator setting configured"]
    pub const fn with_separator(mut self, include: bool) -> Self {
        self.include_separator = include;
        self
    }

    /// Set maximum pages to process
    #[inline]
    #[must_use = "returns options with maximum pages configured"]
    pub const fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Enable per-fragment diagnostics
    #[inline]
    #[must_use = "returns options with debug mode configured"]
    pub const fn with_debug(mut self, enable: bool) -> Self {
        self.debug_mode = enable;
        self
    }

    /// Number of pages to process for a document of `total_pages` pages.
    #[inline]
    #[must_use]
    pub fn pages_to_process(&self, total_pages: usize) -> usize {
        self.max_pages
            .map_or(total_pages, |cap| cap.min(total_pages))
    }
}

impl Default for PipelineOptions {
    #[inline]
    fn default() -> Self {
        Self {
            include_separator: true,
            max_pages: None,
            debug_mode: false,
        }
    }
}
