//! Progress and diagnostic events
//!
//! The pipeline reports progress through an [`EventSink`] instead of writing
//! to the console. Sinks are called synchronously and must return quickly;
//! the pipeline never waits on or retries a sink.
//!
//! ```rust
//! use billsplit_core::event::{EventSink, PipelineEvent};
//! use std::sync::Mutex;
//!
//! let seen = Mutex::new(Vec::new());
//! let sink = |event: &PipelineEvent| seen.lock().unwrap().push(event.clone());
//! sink.emit(&PipelineEvent::PageFailed { page_number: 2, reason: "bad font".into() });
//! assert_eq!(seen.lock().unwrap().len(), 1);
//! ```

use serde::{Deserialize, Serialize};

/// Total for a progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Total {
    /// Total known in advance (page iteration)
    Known(usize),
    /// Total not knowable in advance (archive traversal)
    Indeterminate,
}

impl std::fmt::Display for Total {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{n}"),
            Self::Indeterminate => write!(f, "?"),
        }
    }
}

/// Lifecycle state of a document in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentState {
    /// Bytes accepted by the renderer, page count known
    Loaded,
    /// Pages being processed in ascending order
    PagesIterating,
    /// Page texts joined into `full_text`
    Aggregated,
    /// A new name was synthesised
    Renamed,
    /// Extraction was incomplete; original name kept
    RenameSkipped,
    /// Renderer rejected the bytes
    LoadFailed,
}

impl DocumentState {
    /// Whether the state ends processing of the document.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Renamed | Self::RenameSkipped | Self::LoadFailed)
    }
}

impl std::fmt::Display for DocumentState {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Loaded => "loaded",
            Self::PagesIterating => "pages_iterating",
            Self::Aggregated => "aggregated",
            Self::Renamed => "renamed",
            Self::RenameSkipped => "rename_skipped",
            Self::LoadFailed => "load_failed",
        };
        write!(f, "{s}")
    }
}

/// Kind of entity reported by [`PipelineEvent::EntityExtracted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Passenger name
    PersonName,
    /// Labelled e-ticket number
    TicketNumber,
    /// 20-digit invoice number
    InvoiceNumber,
    /// Digits taken from the file name
    FileSuffix,
}

/// A typed progress or diagnostic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Document state transition
    StateChanged {
        /// Document name
        name: String,
        /// New state
        state: DocumentState,
    },
    /// Renderer accepted the document
    DocumentLoaded {
        /// Document name
        name: String,
        /// Page count reported by the renderer
        total_pages: usize,
        /// Pages that will be processed after applying `max_pages`
        pages_to_process: usize,
    },
    /// A page was extracted
    PageExtracted {
        /// 1-based page number
        page_number: usize,
        /// Total page count
        total: Total,
        /// Page text length in characters
        length: usize,
    },
    /// A page was skipped after an extraction failure
    PageFailed {
        /// 1-based page number
        page_number: usize,
        /// Failure reason
        reason: String,
    },
    /// Raw fragment detail, emitted only in debug mode
    Fragment {
        /// 1-based page number
        page_number: usize,
        /// Position in emission order
        index: usize,
        /// Fragment text
        text: String,
        /// Vertical coordinate, if known
        y: Option<f32>,
        /// Fragment width
        width: f32,
    },
    /// An archive entry was processed
    ArchiveEntry {
        /// Running count of processed entries
        current: usize,
        /// Always indeterminate during traversal
        total: Total,
        /// Entry path including nesting trail
        path: String,
    },
    /// A nested archive was skipped because it is too deep
    NestedArchiveSkipped {
        /// Nested archive path
        path: String,
        /// Depth the archive would have been opened at
        depth: usize,
        /// Configured maximum depth
        max_depth: usize,
    },
    /// A container could not be opened; its subtree was dropped
    ArchiveOpenFailed {
        /// Container path
        path: String,
        /// Failure reason
        reason: String,
    },
    /// An entity extraction attempt finished
    EntityExtracted {
        /// Entity kind
        kind: EntityKind,
        /// Extracted value, `None` when nothing matched
        value: Option<String>,
    },
}

/// Receiver for [`PipelineEvent`]s.
///
/// Implemented for every `Fn(&PipelineEvent) + Send + Sync`, so closures can
/// be passed directly.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: &PipelineEvent);
}

impl<F> EventSink for F
where
    F: Fn(&PipelineEvent) + Send + Sync,
{
    #[inline]
    fn emit(&self, event: &PipelineEvent) {
        self(event);
    }
}

/// Sink that drops every event.
#[inline]
pub fn discard(_event: &PipelineEvent) {}
