//! # billsplit-core - Shared types for the bill ingestion pipeline
//!
//! This crate holds the data model passed between the pipeline stages:
//!
//! | Stage | Produces |
//! |-------|----------|
//! | Archive walker | [`ArchiveEntry`] |
//! | Page renderer | [`TextFragment`] |
//! | Line reconstruction | [`PageText`] |
//! | Orchestrator | [`ParsedDocument`], [`RenameDecision`] |
//! | Entity extraction | [`ExtractedEntities`], [`InvoiceRecord`] |
//!
//! It also defines the error type shared by the pipeline crates and the
//! typed [`PipelineEvent`] stream used for progress reporting.

pub mod document;
pub mod entities;
pub mod error;
pub mod event;
pub mod format;
pub mod report;

pub use document::{
    page_separator, PageText, ParsedDocument, RawDocument, TextFragment, DEFAULT_DOCUMENT_NAME,
    PAGE_BREAK, PAGE_SEPARATOR,
};
pub use entities::{ExtractedEntities, InvoiceRecord, RenameDecision};
pub use error::{BillsplitError, Result};
pub use event::{discard, DocumentState, EntityKind, EventSink, PipelineEvent, Total};
pub use format::{ArchiveEntry, EntryKind};
pub use report::{render_report, ReportOptions};
