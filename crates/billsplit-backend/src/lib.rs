//! # billsplit-backend - Document pipeline for bill PDFs
//!
//! This crate connects the rendering collaborator to the text and archive
//! crates:
//!
//! - [`DocumentRenderer`] / [`RenderedDocument`]: the interface a PDF engine
//!   implements (page count plus positioned text fragments per page)
//! - [`PdfiumRenderer`]: the default implementation over `pdfium-render`
//!   (feature `pdfium`)
//! - [`parse_document`] / [`process_document`]: the per-document pipeline
//! - [`rename_archive`], [`process_batch`], [`extract_bill_records`]: batch
//!   operations with per-item outcomes
//!
//! ## Quick Start
//!
//! ```ignore
//! use billsplit_backend::{process_document, PdfiumRenderer, PipelineOptions};
//! use billsplit_core::{discard, RawDocument};
//!
//! let renderer = PdfiumRenderer::new()?;
//! let doc = RawDocument::new("18812330_26329166851000023784.pdf", std::fs::read("ticket.pdf")?);
//! let outcome = process_document(&renderer, &doc, &PipelineOptions::default(), &discard)?;
//! println!("{}", outcome.decision.effective_name());
//! ```
//!
//! ## Progress
//!
//! Every operation takes an [`EventSink`](billsplit_core::EventSink). Any
//! `Fn(&PipelineEvent) + Send + Sync` closure works; pass
//! [`discard`](billsplit_core::discard) to ignore events.

pub mod batch;
pub mod options;
#[cfg(feature = "pdfium")]
pub mod pdfium;
pub mod pipeline;
pub mod renderer;

pub use batch::{
    extract_bill_records, failure_outcomes, process_batch, process_batch_parallel,
    rename_archive, rename_batch, rename_documents, BatchItem, ItemOutcome, ItemStatus,
    RenameBatchReport, DEFAULT_OUTPUT_NAME,
};
pub use options::PipelineOptions;
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRenderer;
pub use pipeline::{parse_bytes, parse_document, process_document, process_file, DocumentOutcome};
pub use renderer::{DocumentRenderer, RenderError, RenderedDocument};
