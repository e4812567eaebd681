//! Batch processing over many documents
//!
//! Every item in a batch gets its own outcome. A document that cannot be
//! loaded is reported as failed and the batch moves on.

use crate::options::PipelineOptions;
use crate::pipeline::{parse_document, process_document, DocumentOutcome};
use crate::renderer::DocumentRenderer;
use billsplit_archive::{walk_archive, ArchiveBuilder, SubtreeFailure, WalkOptions};
use billsplit_core::{ArchiveEntry, BillsplitError, EventSink, InvoiceRecord, RawDocument, Result};
use billsplit_text::extract_invoice_records;
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Default file name for the output archive of a rename batch.
pub const DEFAULT_OUTPUT_NAME: &str = "renamed_files.zip";

/// What happened to one item of a rename batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Written to the output archive under `new_name`
    Renamed {
        /// Entry name in the output archive
        new_name: String,
    },
    /// Person name or file suffix missing; not written
    Skipped,
    /// Document or container could not be read
    Failed {
        /// Failure reason
        reason: String,
    },
}

/// Outcome of one batch item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemOutcome {
    /// Item path (archive path trail, or document name)
    pub path: String,
    /// Outcome
    #[serde(flatten)]
    pub status: ItemStatus,
}

/// Result of a rename batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameBatchReport {
    /// Output ZIP holding every renamed document
    #[serde(skip)]
    pub archive: Vec<u8>,
    /// Per-item outcomes in input order
    pub items: Vec<ItemOutcome>,
}

impl RenameBatchReport {
    /// Number of items written to the output archive.
    #[must_use]
    pub fn renamed(&self) -> usize {
        self.count(|status| matches!(status, ItemStatus::Renamed { .. }))
    }

    /// Number of items left out for lack of entities.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, ItemStatus::Skipped))
    }

    /// Number of items that could not be read.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, ItemStatus::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&ItemStatus) -> bool) -> usize {
        self.items.iter().filter(|item| predicate(&item.status)).count()
    }
}

/// One document of a rename batch, with the path it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// Archive path trail, or the document name for loose files
    pub path: String,
    /// The document itself
    pub document: RawDocument,
}

impl From<RawDocument> for BatchItem {
    fn from(document: RawDocument) -> Self {
        Self {
            path: document.name.clone(),
            document,
        }
    }
}

impl From<ArchiveEntry> for BatchItem {
    fn from(entry: ArchiveEntry) -> Self {
        Self {
            path: entry.path,
            document: RawDocument::new(entry.name, entry.bytes),
        }
    }
}

/// Rename a batch of documents and package the renamed ones into a ZIP.
///
/// Items are processed in order. Renamed documents are written under their
/// new name; documents missing a person name or file suffix are skipped;
/// documents that cannot be loaded are reported as failed.
///
/// # Errors
///
/// Returns `BillsplitError::ArchiveBuild` if the output archive cannot be
/// written. Per-document failures are reported in the item outcomes.
pub fn rename_batch<R>(
    renderer: &R,
    items: Vec<BatchItem>,
    options: &PipelineOptions,
    sink: &dyn EventSink,
) -> Result<RenameBatchReport>
where
    R: DocumentRenderer + ?Sized,
{
    let mut builder = ArchiveBuilder::new();
    let mut report = RenameBatchReport::default();

    for BatchItem { path, document } in items {
        let status = match process_document(renderer, &document, options, sink) {
            Ok(outcome) => {
                let written = builder
                    .add(&document.bytes, outcome.decision.new_name.as_deref())
                    .map_err(|e| BillsplitError::ArchiveBuild(e.to_string()))?;
                match written {
                    Some(new_name) => {
                        info!("Renamed {path} -> {new_name}");
                        ItemStatus::Renamed { new_name }
                    }
                    None => {
                        info!("Kept {path}: name or suffix not found");
                        ItemStatus::Skipped
                    }
                }
            }
            Err(e) => {
                warn!("Skipping {path}: {e}");
                ItemStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        report.items.push(ItemOutcome { path, status });
    }

    report.archive = builder
        .finish()
        .map_err(|e| BillsplitError::ArchiveBuild(e.to_string()))?;
    info!(
        "Rename batch finished: {} renamed, {} skipped, {} failed",
        report.renamed(),
        report.skipped(),
        report.failed()
    );
    Ok(report)
}

/// Rename a set of loose documents; each is reported under its own name.
///
/// # Errors
///
/// Returns `BillsplitError::ArchiveBuild` if the output archive cannot be written.
pub fn rename_documents<R>(
    renderer: &R,
    docs: Vec<RawDocument>,
    options: &PipelineOptions,
    sink: &dyn EventSink,
) -> Result<RenameBatchReport>
where
    R: DocumentRenderer + ?Sized,
{
    rename_batch(renderer, docs.into_iter().map(BatchItem::from).collect(), options, sink)
}

/// Outcomes for nested archives the walker could not open.
#[must_use]
pub fn failure_outcomes(failures: Vec<SubtreeFailure>) -> Vec<ItemOutcome> {
    failures
        .into_iter()
        .map(|failure| ItemOutcome {
            path: failure.path,
            status: ItemStatus::Failed {
                reason: failure.reason,
            },
        })
        .collect()
}

/// Rename every PDF inside a ZIP (nested ZIPs included) into a new ZIP.
///
/// Nested archives that cannot be opened appear as failed items; the rest of
/// the archive is still processed.
///
/// # Errors
///
/// Returns `BillsplitError::ArchiveOpen` if the top-level buffer is not a
/// readable archive, or `BillsplitError::ArchiveBuild` if the output
/// archive cannot be written.
pub fn rename_archive<R>(
    renderer: &R,
    archive: &[u8],
    options: &PipelineOptions,
    walk_options: &WalkOptions,
    sink: &dyn EventSink,
) -> Result<RenameBatchReport>
where
    R: DocumentRenderer + ?Sized,
{
    let walk = walk_archive(archive, walk_options, sink)?;
    info!("Renaming {} documents from archive", walk.entries.len());

    let items = walk.entries.into_iter().map(BatchItem::from).collect();
    let mut report = rename_batch(renderer, items, options, sink)?;
    let mut items = failure_outcomes(walk.failures);
    items.append(&mut report.items);
    report.items = items;
    Ok(report)
}

/// Run the full pipeline over each document in turn.
///
/// The result for each document is returned in input order; a load failure
/// affects only its own slot.
#[must_use]
pub fn process_batch<R>(
    renderer: &R,
    docs: &[RawDocument],
    options: &PipelineOptions,
    sink: &dyn EventSink,
) -> Vec<Result<DocumentOutcome>>
where
    R: DocumentRenderer + ?Sized,
{
    docs.iter()
        .map(|doc| process_document(renderer, doc, options, sink))
        .collect()
}

/// Run the full pipeline over documents on the rayon thread pool.
///
/// Each document is still processed page by page on a single thread.
/// Results keep input order.
#[must_use]
pub fn process_batch_parallel<R>(
    renderer: &R,
    docs: &[RawDocument],
    options: &PipelineOptions,
    sink: &dyn EventSink,
) -> Vec<Result<DocumentOutcome>>
where
    R: DocumentRenderer + Sync + ?Sized,
{
    docs.par_iter()
        .map(|doc| process_document(renderer, doc, options, sink))
        .collect()
}

/// Parse a bill and extract one invoice record per page that has any.
///
/// # Errors
///
/// Returns `BillsplitError::DocumentLoad` if the renderer cannot open the bytes.
pub fn extract_bill_records<R>(
    renderer: &R,
    doc: &RawDocument,
    options: &PipelineOptions,
    sink: &dyn EventSink,
) -> Result<Vec<InvoiceRecord>>
where
    R: DocumentRenderer + ?Sized,
{
    let parsed = parse_document(renderer, doc, options, sink)?;
    let records = extract_invoice_records(&parsed);
    info!("{}: {} invoice records", doc.name, records.len());
    Ok(records)
}
