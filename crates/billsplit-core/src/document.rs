//! Parsed document types
//!
//! A document moves through the pipeline as raw bytes ([`RawDocument`]),
//! per-page positioned fragments ([`TextFragment`]) and finally a
//! [`ParsedDocument`] holding the reconstructed text of every page that
//! could be extracted.

use serde::{Deserialize, Serialize};

/// Name given to documents supplied without one.
pub const DEFAULT_DOCUMENT_NAME: &str = "unknown.pdf";

/// Visible page-break marker inserted between pages when separators are enabled.
pub const PAGE_SEPARATOR: &str = "\n\n--- 页面分隔 ---\n\n";

/// Plain break inserted between pages when the visible marker is disabled.
pub const PAGE_BREAK: &str = "\n\n";

/// Returns the string placed between consecutive pages in `full_text`.
#[inline]
#[must_use]
pub const fn page_separator(include_separator: bool) -> &'static str {
    if include_separator {
        PAGE_SEPARATOR
    } else {
        PAGE_BREAK
    }
}

/// A document as handed to the pipeline by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawDocument {
    /// File name, used for suffix extraction and renaming
    pub name: String,
    /// Raw document bytes
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl RawDocument {
    /// Create a named document.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Create a document without a known name; it is labelled [`DEFAULT_DOCUMENT_NAME`].
    #[inline]
    #[must_use]
    pub fn unnamed(bytes: Vec<u8>) -> Self {
        Self::new(DEFAULT_DOCUMENT_NAME, bytes)
    }
}

/// A positioned run of text emitted by the page renderer.
///
/// Fragments arrive in the renderer's emission order, which follows visual
/// reading order but carries no explicit line boundaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Text content, kept verbatim
    pub text: String,
    /// Vertical coordinate in page units; `None` when the renderer gave none
    pub y: Option<f32>,
    /// Advance width in page units
    pub width: f32,
}

impl TextFragment {
    /// Create a fragment with a known vertical position.
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, y: f32, width: f32) -> Self {
        Self {
            text: text.into(),
            y: Some(y),
            width,
        }
    }

    /// Vertical coordinate, with missing positions treated as 0.
    #[inline]
    #[must_use]
    pub fn y_or_zero(&self) -> f32 {
        self.y.unwrap_or(0.0)
    }
}

/// Reconstructed text of one successfully processed page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number
    pub page_number: usize,
    /// Reconstructed page text
    pub text: String,
    /// Length of `text` in characters
    pub length: usize,
}

impl PageText {
    /// Create a page record; `length` is derived from `text`.
    #[inline]
    #[must_use]
    pub fn new(page_number: usize, text: String) -> Self {
        let length = text.chars().count();
        Self {
            page_number,
            text,
            length,
        }
    }
}

/// Aggregated result of parsing one document.
///
/// `pages` only contains pages that were extracted successfully, in strictly
/// ascending page order. `full_text` is always the join of `pages[].text`
/// with the separator chosen at parse time, see [`ParsedDocument::join_pages`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Document name
    pub name: String,
    /// Page count reported by the renderer (not capped by `max_pages`)
    pub total_pages: usize,
    /// Successfully extracted pages
    pub pages: Vec<PageText>,
    /// All page texts joined with the page separator
    pub full_text: String,
}

impl ParsedDocument {
    /// Aggregate extracted pages into a document.
    ///
    /// Pages are sorted by page number before joining so the ordering
    /// invariant holds even if the caller collected them out of order.
    #[must_use]
    pub fn from_pages(
        name: impl Into<String>,
        total_pages: usize,
        mut pages: Vec<PageText>,
        include_separator: bool,
    ) -> Self {
        pages.sort_by_key(|page| page.page_number);
        pages.dedup_by_key(|page| page.page_number);
        let full_text = Self::join_pages(&pages, include_separator);
        Self {
            name: name.into(),
            total_pages,
            pages,
            full_text,
        }
    }

    /// Join page texts with the separator policy.
    #[must_use]
    pub fn join_pages(pages: &[PageText], include_separator: bool) -> String {
        let separator = page_separator(include_separator);
        let mut full_text = String::new();
        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                full_text.push_str(separator);
            }
            full_text.push_str(&page.text);
        }
        full_text
    }

    /// Whether `full_text` matches a re-aggregation of `pages`.
    #[must_use]
    pub fn is_consistent(&self, include_separator: bool) -> bool {
        let ordered = self
            .pages
            .windows(2)
            .all(|pair| pair[0].page_number < pair[1].page_number);
        let lengths = self
            .pages
            .iter()
            .all(|page| page.length == page.text.chars().count());
        ordered && lengths && Self::join_pages(&self.pages, include_separator) == self.full_text
    }

    /// Number of pages that were extracted successfully.
    #[inline]
    #[must_use]
    pub fn extracted_pages(&self) -> usize {
        self.pages.len()
    }

    /// Length of `full_text` in characters.
    #[inline]
    #[must_use]
    pub fn text_length(&self) -> usize {
        self.full_text.chars().count()
    }
}
