//! Per-document pipeline orchestration
//!
//! A document moves through
//! `Loaded -> PagesIterating -> Aggregated -> (Renamed | RenameSkipped)`.
//! Pages are processed strictly in ascending order. A page whose fragments
//! cannot be read is reported and left out of `full_text`; the document
//! still completes with the remaining pages. Only a load failure ends the
//! document in `LoadFailed` and is returned as an error.

use crate::options::PipelineOptions;
use crate::renderer::DocumentRenderer;
use billsplit_core::{
    BillsplitError, DocumentState, EntityKind, EventSink, ExtractedEntities, PageText,
    ParsedDocument, PipelineEvent, RawDocument, RenameDecision, Result, Total,
};
use billsplit_text::{decide_rename, extract_entities, extract_file_suffix, reconstruct_lines};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Result of running the full pipeline over one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    /// Parsed page texts
    pub parsed: ParsedDocument,
    /// Entities found in the aggregated text
    pub entities: ExtractedEntities,
    /// Rename decision for the document
    pub decision: RenameDecision,
    /// Terminal state, `Renamed` or `RenameSkipped`
    pub state: DocumentState,
}

fn change_state(sink: &dyn EventSink, name: &str, state: DocumentState) {
    debug!("{name}: {state}");
    sink.emit(&PipelineEvent::StateChanged {
        name: name.to_string(),
        state,
    });
}

/// Extract the text of every readable page of a document.
///
/// Pages `1..=N` are read in order, where `N` is the page count capped by
/// `options.max_pages`. Each page's fragments are rebuilt into lines; pages
/// that fail are reported through `PageFailed` events and skipped.
///
/// # Errors
///
/// Returns `BillsplitError::DocumentLoad` if the renderer cannot open the
/// bytes. Page failures are never returned as errors.
///
/// # Examples
///
/// ```ignore
/// use billsplit_backend::{parse_document, PdfiumRenderer, PipelineOptions};
/// use billsplit_core::{discard, RawDocument};
///
/// let renderer = PdfiumRenderer::new()?;
/// let doc = RawDocument::new("ticket.pdf", std::fs::read("ticket.pdf")?);
/// let parsed = parse_document(&renderer, &doc, &PipelineOptions::default(), &discard)?;
/// println!("{}", parsed.full_text);
/// ```
pub fn parse_document<R>(
    renderer: &R,
    doc: &RawDocument,
    options: &PipelineOptions,
    sink: &dyn EventSink,
) -> Result<ParsedDocument>
where
    R: DocumentRenderer + ?Sized,
{
    let name = doc.name.as_str();
    let rendered = match renderer.load(&doc.bytes) {
        Ok(rendered) => rendered,
        Err(e) => {
            warn!("Failed to load {name}: {e}");
            change_state(sink, name, DocumentState::LoadFailed);
            return Err(e.into_pipeline_error(name));
        }
    };

    let total_pages = rendered.page_count();
    let pages_to_process = options.pages_to_process(total_pages);
    info!("Loaded {name}: {total_pages} pages, processing {pages_to_process}");
    change_state(sink, name, DocumentState::Loaded);
    sink.emit(&PipelineEvent::DocumentLoaded {
        name: name.to_string(),
        total_pages,
        pages_to_process,
    });

    change_state(sink, name, DocumentState::PagesIterating);
    let mut pages = Vec::with_capacity(pages_to_process);
    for page_number in 1..=pages_to_process {
        let fragments = match rendered.page_fragments(page_number) {
            Ok(fragments) => fragments,
            Err(e) => {
                let err = e.into_pipeline_error(name);
                warn!("{name}: {err}");
                sink.emit(&PipelineEvent::PageFailed {
                    page_number,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if options.debug_mode {
            for (index, fragment) in fragments.iter().enumerate() {
                debug!(
                    "{name} p{page_number} #{index}: {:?} (width {}, y {:?})",
                    fragment.text, fragment.width, fragment.y
                );
                sink.emit(&PipelineEvent::Fragment {
                    page_number,
                    index,
                    text: fragment.text.clone(),
                    y: fragment.y,
                    width: fragment.width,
                });
            }
        }

        let page = PageText::new(page_number, reconstruct_lines(&fragments));
        debug!("{name}: page {page_number}/{pages_to_process} has {} chars", page.length);
        sink.emit(&PipelineEvent::PageExtracted {
            page_number,
            total: Total::Known(pages_to_process),
            length: page.length,
        });
        pages.push(page);
    }

    let parsed = ParsedDocument::from_pages(name, total_pages, pages, options.include_separator);
    change_state(sink, name, DocumentState::Aggregated);
    info!(
        "Parsed {name}: {}/{pages_to_process} pages, {} chars",
        parsed.extracted_pages(),
        parsed.text_length()
    );
    Ok(parsed)
}

/// Parse a document, extract its entities and decide its new name.
///
/// Missing entities are normal outcomes: the document then finishes in
/// `RenameSkipped` with its original name.
///
/// # Errors
///
/// Returns `BillsplitError::DocumentLoad` if the renderer cannot open the bytes.
pub fn process_document<R>(
    renderer: &R,
    doc: &RawDocument,
    options: &PipelineOptions,
    sink: &dyn EventSink,
) -> Result<DocumentOutcome>
where
    R: DocumentRenderer + ?Sized,
{
    let parsed = parse_document(renderer, doc, options, sink)?;
    let entities = extract_entities(&parsed.full_text);
    let suffix = extract_file_suffix(&doc.name);

    for (kind, value) in [
        (EntityKind::PersonName, &entities.person_name),
        (EntityKind::TicketNumber, &entities.ticket_number),
        (EntityKind::InvoiceNumber, &entities.invoice_number),
        (EntityKind::FileSuffix, &suffix),
    ] {
        sink.emit(&PipelineEvent::EntityExtracted {
            kind,
            value: value.clone(),
        });
    }

    let decision = decide_rename(&doc.name, entities.person_name.as_deref());
    let state = if decision.is_renamed() {
        DocumentState::Renamed
    } else {
        DocumentState::RenameSkipped
    };
    change_state(sink, &doc.name, state);

    Ok(DocumentOutcome {
        parsed,
        entities,
        decision,
        state,
    })
}

/// Parse a document given only its bytes; it is named `unknown.pdf`.
///
/// # Errors
///
/// Returns `BillsplitError::DocumentLoad` if the renderer cannot open the bytes.
pub fn parse_bytes<R>(renderer: &R, bytes: Vec<u8>, options: &PipelineOptions) -> Result<ParsedDocument>
where
    R: DocumentRenderer + ?Sized,
{
    parse_document(renderer, &RawDocument::unnamed(bytes), options, &billsplit_core::discard)
}

/// Read a document from disk and run the full pipeline on it.
///
/// # Errors
///
/// Returns `BillsplitError::IoError` if the file cannot be read, or
/// `BillsplitError::DocumentLoad` if the renderer rejects it.
pub fn process_file<R>(
    renderer: &R,
    path: &std::path::Path,
    options: &PipelineOptions,
    sink: &dyn EventSink,
) -> Result<DocumentOutcome>
where
    R: DocumentRenderer + ?Sized,
{
    let bytes = std::fs::read(path).map_err(BillsplitError::IoError)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| billsplit_core::DEFAULT_DOCUMENT_NAME.to_string(), str::to_string);
    process_document(renderer, &RawDocument::new(name, bytes), options, sink)
}
