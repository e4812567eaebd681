//! Human-readable summary of a parsed document

use crate::document::ParsedDocument;
use std::fmt::Write;

/// Options for [`render_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportOptions {
    /// Append the complete `full_text`
    pub print_full_text: bool,
    /// Include a preview of each page's text
    pub print_page_text: bool,
    /// Characters shown per page preview before truncation
    pub max_preview_length: usize,
}

impl Default for ReportOptions {
    #[inline]
    fn default() -> Self {
        Self {
            print_full_text: false,
            print_page_text: true,
            max_preview_length: 500,
        }
    }
}

/// Marker appended to truncated page previews.
pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// Truncate `text` to at most `max_chars` characters, appending the marker when cut.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Render a report of a parsed document.
#[must_use]
pub fn render_report(doc: &ParsedDocument, options: &ReportOptions) -> String {
    let rule = "=".repeat(80);
    let thin = "-".repeat(80);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "File:            {}", doc.name);
    let _ = writeln!(out, "Total pages:     {}", doc.total_pages);
    let _ = writeln!(out, "Pages extracted: {}", doc.extracted_pages());
    let _ = writeln!(out, "Text length:     {} chars", doc.text_length());
    let _ = writeln!(out, "{thin}");

    for page in &doc.pages {
        let _ = writeln!(out, "[Page {}] {} chars", page.page_number, page.length);
        if options.print_page_text && !page.text.is_empty() {
            let _ = writeln!(out, "{}", preview(&page.text, options.max_preview_length));
        }
    }

    if options.print_full_text {
        let _ = writeln!(out, "{thin}");
        let _ = writeln!(out, "{}", doc.full_text);
    }

    let _ = writeln!(out, "{rule}");
    out
}
