//! End-to-end text tests: fragments -> lines -> entities -> rename decision

use billsplit_core::TextFragment;
use billsplit_text::{
    decide_rename, extract_entities, extract_invoice_record, reconstruct_lines,
};
use proptest::prelude::*;

fn ticket_page() -> Vec<TextFragment> {
    vec![
        TextFragment::new("电子发票（铁路电子客票）", 780.0, 200.0),
        TextFragment::new("发票号码:", 760.0, 40.0),
        TextFragment::new("26329166851000023784", 760.5, 90.0),
        TextFragment::new("4202221988****5775", 700.0, 80.0),
        TextFragment::new("肖烨", 700.0, 20.0),
        TextFragment::new("电子客票号:", 680.0, 50.0),
        TextFragment::new("6580074086121798365302025", 680.0, 120.0),
    ]
}

#[test]
fn test_page_to_rename_decision() {
    let text = reconstruct_lines(&ticket_page());
    assert_eq!(
        text,
        "电子发票（铁路电子客票）\n发票号码:26329166851000023784\n4202221988****5775肖烨\n电子客票号:6580074086121798365302025"
    );

    let entities = extract_entities(&text);
    assert_eq!(entities.person_name.as_deref(), Some("肖烨"));
    assert_eq!(
        entities.ticket_number.as_deref(),
        Some("6580074086121798365302025")
    );
    assert_eq!(
        entities.invoice_number.as_deref(),
        Some("26329166851000023784")
    );

    let decision = decide_rename(
        "18812330_26329166851000023784.pdf",
        entities.person_name.as_deref(),
    );
    assert_eq!(
        decision.new_name.as_deref(),
        Some("肖烨_26329166851000023784.pdf")
    );
}

#[test]
fn test_bill_page_invoice_pair() {
    let fragments = vec![
        TextFragment::new("XY6580074086121ABCDEFGHIJKLMNOP", 500.0, 300.0),
        TextFragment::new("发票号码：", 400.0, 40.0),
        TextFragment::new("26329166851000023784", 400.0, 90.0),
    ];
    let text = reconstruct_lines(&fragments);
    let record = extract_invoice_record(&text, 1).expect("record");
    assert_eq!(record.ticket_number.as_deref(), Some("6580074086121"));
    assert_eq!(
        record.invoice_number.as_deref(),
        Some("26329166851000023784")
    );
}

/// Property: reconstruction never drops text and never adds anything but newlines
#[test]
fn proptest_reconstruction_preserves_text() {
    proptest!(|(items in proptest::collection::vec(("[a-z肖烨 ]{0,6}", -1000.0f32..1000.0), 0..30))| {
        let fragments: Vec<TextFragment> = items
            .iter()
            .map(|(text, y)| TextFragment::new(text.clone(), *y, 1.0))
            .collect();
        let text = reconstruct_lines(&fragments);
        let expected: String = items.iter().map(|(t, _)| t.as_str()).collect();
        prop_assert_eq!(text.replace('\n', ""), expected);
        prop_assert!(text.matches('\n').count() <= fragments.len().saturating_sub(1));
    });
}

/// Property: entity extraction never panics on arbitrary text
#[test]
fn proptest_extraction_no_panic() {
    proptest!(|(text in "\\PC{0,200}")| {
        let _ = extract_entities(&text);
        let _ = extract_invoice_record(&text, 1);
    });
}
