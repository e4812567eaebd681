//! `PDFium`-backed renderer
//!
//! Uses `pdfium-render` bound to the platform `PDFium` library, looked up
//! next to the executable first and system-wide second. Each text segment
//! becomes one [`TextFragment`] whose vertical coordinate is the segment's
//! bottom edge in PDF points (bottom-left origin).

use crate::renderer::{DocumentRenderer, RenderError, RenderedDocument};
use billsplit_core::TextFragment;
use log::debug;
use pdfium_render::prelude::*;

/// Renderer backed by a bound `PDFium` library.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl std::fmt::Debug for PdfiumRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumRenderer").finish_non_exhaustive()
    }
}

impl PdfiumRenderer {
    /// Bind the `PDFium` library.
    ///
    /// # Errors
    /// Returns `RenderError::Unavailable` if no `PDFium` library can be found.
    pub fn new() -> Result<Self, RenderError> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| RenderError::Unavailable(format!("Failed to bind pdfium library: {e}")))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl DocumentRenderer for PdfiumRenderer {
    fn load<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RenderedDocument + 'a>, RenderError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| RenderError::Load(e.to_string()))?;
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl RenderedDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        usize::try_from(self.document.pages().len()).unwrap_or(0)
    }

    fn page_fragments(&self, page_number: usize) -> Result<Vec<TextFragment>, RenderError> {
        let page_error = |reason: String| RenderError::Page {
            page_number,
            reason,
        };

        let index = page_number
            .checked_sub(1)
            .and_then(|index| PdfPageIndex::try_from(index).ok())
            .ok_or_else(|| page_error("page number out of range".to_string()))?;
        let page = self
            .document
            .pages()
            .get(index)
            .map_err(|e| page_error(e.to_string()))?;
        let text = page
            .text()
            .map_err(|e| page_error(format!("Failed to get page text: {e}")))?;

        let fragments: Vec<TextFragment> = text
            .segments()
            .iter()
            .map(|segment| {
                let bounds = segment.bounds();
                TextFragment::new(
                    segment.text(),
                    bounds.bottom().value,
                    bounds.right().value - bounds.left().value,
                )
            })
            .collect();
        debug!("Page {page_number}: {} text segments", fragments.len());
        Ok(fragments)
    }
}
