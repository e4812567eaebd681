//! Pipeline tests against an in-memory renderer
//!
//! The fake renderer reads its "document" as UTF-8: pages are separated by a
//! form feed, each line becomes one fragment 20 units below the previous
//! one. A page consisting of `!FAIL` cannot be read, and a document starting
//! with `!BROKEN` cannot be loaded.

use billsplit_archive::WalkOptions;
use billsplit_backend::{
    extract_bill_records, parse_bytes, parse_document, process_batch, process_batch_parallel,
    process_document, rename_archive, rename_documents, DocumentOutcome, DocumentRenderer, ItemStatus,
    PipelineOptions, RenderError, RenderedDocument,
};
use billsplit_core::{
    discard, BillsplitError, DocumentState, EntityKind, PipelineEvent, RawDocument, TextFragment,
    Total, PAGE_BREAK, PAGE_SEPARATOR,
};
use std::io::{Cursor, Read, Write};
use std::sync::Mutex;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::ZipArchive;

struct FakeRenderer;

struct FakeDocument {
    pages: Vec<String>,
}

impl DocumentRenderer for FakeRenderer {
    fn load<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RenderedDocument + 'a>, RenderError> {
        let text = std::str::from_utf8(bytes).map_err(|e| RenderError::Load(e.to_string()))?;
        if text.starts_with("!BROKEN") {
            return Err(RenderError::Load("Invalid PDF header".to_string()));
        }
        Ok(Box::new(FakeDocument {
            pages: text.split('\x0c').map(str::to_string).collect(),
        }))
    }
}

impl RenderedDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_fragments(&self, page_number: usize) -> Result<Vec<TextFragment>, RenderError> {
        let page = &self.pages[page_number - 1];
        if page == "!FAIL" {
            return Err(RenderError::Page {
                page_number,
                reason: "corrupt content stream".to_string(),
            });
        }
        Ok(page
            .lines()
            .enumerate()
            .map(|(i, line)| TextFragment::new(line, 800.0 - 20.0 * i as f32, 100.0))
            .collect())
    }
}

const TICKET_PAGE: &str = "航空运输电子客票行程单\n4202221988****5775肖烨\n电子客票号:6580074086121798365302025";
const TICKET_NAME: &str = "18812330_26329166851000023784.pdf";

fn doc(name: &str, pages: &[&str]) -> RawDocument {
    RawDocument::new(name, pages.join("\x0c").into_bytes())
}

fn collect_events<T>(run: impl FnOnce(&dyn billsplit_core::EventSink) -> T) -> (T, Vec<PipelineEvent>) {
    let events = Mutex::new(Vec::new());
    let sink = |event: &PipelineEvent| events.lock().unwrap().push(event.clone());
    let result = run(&sink);
    (result, events.into_inner().unwrap())
}

fn states(events: &[PipelineEvent]) -> Vec<DocumentState> {
    events
        .iter()
        .filter_map(|event| match event {
            PipelineEvent::StateChanged { state, .. } => Some(*state),
            _ => None,
        })
        .collect()
}

fn names(results: &[billsplit_core::Result<DocumentOutcome>]) -> Vec<String> {
    results
        .iter()
        .map(|r| r.as_ref().unwrap().parsed.name.clone())
        .collect()
}

fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

#[test]
fn test_pages_are_reconstructed_and_joined() {
    let input = doc("a.pdf", &["A\nB", "C"]);
    let parsed = parse_document(&FakeRenderer, &input, &PipelineOptions::default(), &discard).unwrap();
    assert_eq!(parsed.total_pages, 2);
    assert_eq!(parsed.pages.len(), 2);
    assert_eq!(parsed.pages[0].text, "A\nB");
    assert_eq!(parsed.full_text, format!("A\nB{PAGE_SEPARATOR}C"));
    assert!(parsed.is_consistent(true));
}

#[test]
fn test_page_failure_is_isolated() {
    let input = doc("a.pdf", &["one", "!FAIL", "three"]);
    let (parsed, events) = collect_events(|sink| {
        parse_document(&FakeRenderer, &input, &PipelineOptions::default(), sink)
    });
    let parsed = parsed.unwrap();

    let numbers: Vec<_> = parsed.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, vec![1, 3]);
    assert_eq!(parsed.total_pages, 3);
    assert_eq!(parsed.full_text, format!("one{PAGE_SEPARATOR}three"));
    assert!(events
        .iter()
        .any(|e| matches!(e, PipelineEvent::PageFailed { page_number: 2, .. })));
    assert_eq!(
        states(&events),
        vec![
            DocumentState::Loaded,
            DocumentState::PagesIterating,
            DocumentState::Aggregated
        ]
    );
}

#[test]
fn test_all_pages_failing_still_aggregates() {
    let input = doc("a.pdf", &["!FAIL", "!FAIL"]);
    let parsed = parse_document(&FakeRenderer, &input, &PipelineOptions::default(), &discard).unwrap();
    assert!(parsed.pages.is_empty());
    assert_eq!(parsed.full_text, "");
}

#[test]
fn test_load_failure_is_the_only_error() {
    let input = doc("bad.pdf", &["!BROKEN"]);
    let (result, events) = collect_events(|sink| {
        parse_document(&FakeRenderer, &input, &PipelineOptions::default(), sink)
    });
    assert!(matches!(result, Err(BillsplitError::DocumentLoad { ref name, .. }) if name == "bad.pdf"));
    assert_eq!(states(&events), vec![DocumentState::LoadFailed]);
}

#[test]
fn test_max_pages_caps_processing() {
    let input = doc("a.pdf", &["1", "2", "3"]);
    let options = PipelineOptions::default().with_max_pages(Some(2));
    let (parsed, events) = collect_events(|sink| parse_document(&FakeRenderer, &input, &options, sink));
    let parsed = parsed.unwrap();
    assert_eq!(parsed.total_pages, 3);
    assert_eq!(parsed.pages.len(), 2);
    assert!(events.contains(&PipelineEvent::DocumentLoaded {
        name: "a.pdf".to_string(),
        total_pages: 3,
        pages_to_process: 2,
    }));
    assert!(events.contains(&PipelineEvent::PageExtracted {
        page_number: 2,
        total: Total::Known(2),
        length: 1,
    }));
}

#[test]
fn test_separator_can_be_disabled() {
    let input = doc("a.pdf", &["x", "y"]);
    let options = PipelineOptions::default().with_separator(false);
    let parsed = parse_document(&FakeRenderer, &input, &options, &discard).unwrap();
    assert_eq!(parsed.full_text, format!("x{PAGE_BREAK}y"));
}

#[test]
fn test_debug_mode_only_adds_events() {
    let input = doc("a.pdf", &["A\nB"]);
    let plain = parse_document(&FakeRenderer, &input, &PipelineOptions::default(), &discard).unwrap();
    let options = PipelineOptions::default().with_debug(true);
    let (debug, events) = collect_events(|sink| parse_document(&FakeRenderer, &input, &options, sink));
    assert_eq!(debug.unwrap(), plain);
    let fragments = events
        .iter()
        .filter(|e| matches!(e, PipelineEvent::Fragment { .. }))
        .count();
    assert_eq!(fragments, 2);
}

#[test]
fn test_unnamed_bytes_get_default_name() {
    let parsed = parse_bytes(&FakeRenderer, b"hello".to_vec(), &PipelineOptions::default()).unwrap();
    assert_eq!(parsed.name, "unknown.pdf");
}

#[test]
fn test_document_is_renamed() {
    let input = doc(TICKET_NAME, &[TICKET_PAGE]);
    let (outcome, events) = collect_events(|sink| {
        process_document(&FakeRenderer, &input, &PipelineOptions::default(), sink)
    });
    let outcome = outcome.unwrap();
    assert_eq!(outcome.entities.person_name.as_deref(), Some("肖烨"));
    assert_eq!(
        outcome.entities.ticket_number.as_deref(),
        Some("6580074086121798365302025")
    );
    assert_eq!(
        outcome.decision.new_name.as_deref(),
        Some("肖烨_26329166851000023784.pdf")
    );
    assert_eq!(outcome.state, DocumentState::Renamed);
    assert!(events.contains(&PipelineEvent::EntityExtracted {
        kind: EntityKind::FileSuffix,
        value: Some("26329166851000023784".to_string()),
    }));
    assert_eq!(states(&events).last(), Some(&DocumentState::Renamed));
}

#[test]
fn test_missing_name_skips_rename() {
    let input = doc(TICKET_NAME, &["no passenger here"]);
    let outcome = process_document(&FakeRenderer, &input, &PipelineOptions::default(), &discard).unwrap();
    assert_eq!(outcome.decision.new_name, None);
    assert_eq!(outcome.decision.effective_name(), TICKET_NAME);
    assert_eq!(outcome.state, DocumentState::RenameSkipped);
}

#[test]
fn test_batch_reports_each_item() {
    let docs = vec![
        doc(TICKET_NAME, &[TICKET_PAGE]),
        doc("bad.pdf", &["!BROKEN"]),
        doc("plain.pdf", &["nothing"]),
    ];
    let results = process_batch(&FakeRenderer, &docs, &PipelineOptions::default(), &discard);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().state, DocumentState::Renamed);
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().state, DocumentState::RenameSkipped);
}

#[test]
fn test_parallel_batch_keeps_order() {
    let docs: Vec<_> = (0..16)
        .map(|i| doc(&format!("doc_{i}.pdf"), &[&format!("page of {i}")]))
        .collect();
    let options = PipelineOptions::default();
    let sequential = process_batch(&FakeRenderer, &docs, &options, &discard);
    let parallel = process_batch_parallel(&FakeRenderer, &docs, &options, &discard);
    assert_eq!(names(&sequential), names(&parallel));
}

#[test]
fn test_rename_documents_builds_archive() {
    let docs = vec![
        doc(TICKET_NAME, &[TICKET_PAGE]),
        doc("bad.pdf", &["!BROKEN"]),
        doc("plain.pdf", &["nothing"]),
        doc("99_26329166851000023784.pdf", &[TICKET_PAGE]),
    ];
    let report = rename_documents(&FakeRenderer, docs, &PipelineOptions::default(), &discard).unwrap();
    assert_eq!(report.renamed(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(
        report.items[3].status,
        ItemStatus::Renamed {
            new_name: "肖烨_26329166851000023784 (2).pdf".to_string()
        }
    );

    let mut archive = ZipArchive::new(Cursor::new(report.archive.as_slice())).unwrap();
    assert_eq!(archive.len(), 2);
    let mut contents = String::new();
    archive
        .by_name("肖烨_26329166851000023784.pdf")
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, TICKET_PAGE);
}

#[test]
fn test_rename_archive_reports_nested_failures() {
    let inner = zip_of(&[(TICKET_NAME, TICKET_PAGE.as_bytes())]);
    let outer = zip_of(&[
        ("nested/inner.zip", &inner),
        ("broken.zip", b"not a zip"),
        ("plain.pdf", b"nothing"),
        ("readme.txt", b"ignored"),
    ]);
    let report = rename_archive(
        &FakeRenderer,
        &outer,
        &PipelineOptions::default(),
        &WalkOptions::default(),
        &discard,
    )
    .unwrap();

    let paths: Vec<_> = report.items.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "broken.zip",
            "nested/inner.zip/18812330_26329166851000023784.pdf",
            "plain.pdf"
        ]
    );
    assert!(matches!(report.items[0].status, ItemStatus::Failed { .. }));
    assert_eq!(report.renamed(), 1);
    assert_eq!(report.skipped(), 1);
}

#[test]
fn test_rename_archive_rejects_corrupt_root() {
    let result = rename_archive(
        &FakeRenderer,
        b"garbage",
        &PipelineOptions::default(),
        &WalkOptions::default(),
        &discard,
    );
    assert!(matches!(result, Err(BillsplitError::ArchiveOpen { .. })));
}

#[test]
fn test_bill_records_per_page() {
    let bill = doc(
        "bill.pdf",
        &[
            "XY6580074086121ABCDEFGHIJKLMN\n发票号码：26329166851000023784",
            "!FAIL",
            "summary page",
        ],
    );
    let records = extract_bill_records(&FakeRenderer, &bill, &PipelineOptions::default(), &discard).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].page_number, 1);
    assert_eq!(records[0].ticket_number.as_deref(), Some("6580074086121"));
    assert_eq!(records[0].invoice_number.as_deref(), Some("26329166851000023784"));
}

#[test]
fn test_process_file_uses_file_name() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join(TICKET_NAME);
    std::fs::write(&path, TICKET_PAGE).unwrap();

    let outcome =
        billsplit_backend::process_file(&FakeRenderer, &path, &PipelineOptions::default(), &discard).unwrap();
    assert_eq!(outcome.parsed.name, TICKET_NAME);
    assert_eq!(outcome.decision.new_name.as_deref(), Some("肖烨_26329166851000023784.pdf"));
}

#[test]
fn test_process_file_missing() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = billsplit_backend::process_file(
        &FakeRenderer,
        &dir.path().join("missing.pdf"),
        &PipelineOptions::default(),
        &discard,
    );
    assert!(matches!(result, Err(BillsplitError::IoError(_))));
}

proptest::proptest! {
    #[test]
    fn prop_failed_pages_never_abort_the_document(failing in proptest::collection::vec(proptest::bool::ANY, 1..12)) {
        let pages: Vec<String> = failing
            .iter()
            .enumerate()
            .map(|(i, fail)| if *fail { "!FAIL".to_string() } else { format!("page {}", i + 1) })
            .collect();
        let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        let input = doc("p.pdf", &page_refs);

        let parsed = parse_document(&FakeRenderer, &input, &PipelineOptions::default(), &discard).unwrap();
        let expected: Vec<usize> = failing
            .iter()
            .enumerate()
            .filter(|(_, fail)| !**fail)
            .map(|(i, _)| i + 1)
            .collect();
        let numbers: Vec<usize> = parsed.pages.iter().map(|page| page.page_number).collect();
        proptest::prop_assert_eq!(parsed.total_pages, failing.len());
        proptest::prop_assert_eq!(numbers, expected);
        proptest::prop_assert!(parsed.is_consistent(true));
    }
}
