//! Ticket/invoice pair extraction for bill pages
//!
//! Bill pages print a long machine-readable code (uppercase letters and
//! digits) that embeds the 13-character e-ticket number at offset 2, and a
//! separate 20-digit invoice number. Both are recovered per page and merged
//! into a single [`InvoiceRecord`].

use crate::entities::{strip_whitespace, INVOICE_NUMBER_LEN};
use billsplit_core::{InvoiceRecord, ParsedDocument};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum length of the machine-readable code run.
pub const MIN_CODE_RUN_LEN: usize = 25;

/// Offset of the ticket number inside the code run.
pub const TICKET_OFFSET: usize = 2;

/// Length of the e-ticket number.
pub const TICKET_NUMBER_LEN: usize = 13;

static CODE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z0-9]{25,}").expect("valid regex"));

// Not anchored to run boundaries: with whitespace stripped, an invoice
// number is often glued to the digits of the following line.
static INVOICE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{20}").expect("valid regex"));

/// Longest code run; ties go to the later run.
fn longest_code_run(text: &str) -> Option<&str> {
    CODE_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .reduce(|longest, run| if longest.len() > run.len() { longest } else { run })
}

/// Cut the ticket number out of a code run.
fn ticket_slice(run: &str) -> String {
    run.chars()
        .skip(TICKET_OFFSET)
        .take(TICKET_NUMBER_LEN)
        .collect()
}

/// Extract the merged ticket/invoice record for one page.
///
/// Returns `None` when the page has no code run of at least
/// [`MIN_CODE_RUN_LEN`] characters; the invoice search only runs once a code
/// run was found. Candidates are classified by length alone: 13 characters
/// is a ticket number, 20 is an invoice number. When several candidates of
/// the same length exist the last one wins.
///
/// # Examples
///
/// ```rust
/// use billsplit_text::extract_invoice_record;
///
/// let page = "AB1234567890123CDEFGHIJKLMNOP 发票号码: 26329166851000023784";
/// let record = extract_invoice_record(page, 1).unwrap();
/// assert_eq!(record.ticket_number.as_deref(), Some("1234567890123"));
/// assert_eq!(record.invoice_number.as_deref(), Some("26329166851000023784"));
/// ```
#[must_use]
pub fn extract_invoice_record(text: &str, page_number: usize) -> Option<InvoiceRecord> {
    let cleaned = strip_whitespace(text);
    debug!(
        "Scanning page {page_number} for invoice data ({} chars)",
        cleaned.chars().count()
    );

    let Some(run) = longest_code_run(&cleaned) else {
        debug!("Page {page_number}: no code run of {MIN_CODE_RUN_LEN}+ characters");
        return None;
    };
    debug!("Page {page_number}: longest code run '{run}' ({} chars)", run.len());

    let mut candidates: Vec<String> = vec![ticket_slice(run)];
    for invoice in INVOICE_DIGITS.find_iter(&cleaned).map(|m| m.as_str()) {
        if !candidates.iter().any(|c| c == invoice) {
            candidates.push(invoice.to_string());
        }
    }

    let mut ticket_number = None;
    let mut invoice_number = None;
    for candidate in candidates {
        match candidate.chars().count() {
            TICKET_NUMBER_LEN => ticket_number = Some(candidate),
            INVOICE_NUMBER_LEN => invoice_number = Some(candidate),
            len => debug!("Page {page_number}: ignoring candidate '{candidate}' of length {len}"),
        }
    }

    if ticket_number.is_none() && invoice_number.is_none() {
        return None;
    }

    let original_value = ticket_number.clone().or_else(|| invoice_number.clone());
    Some(InvoiceRecord {
        ticket_number,
        invoice_number,
        original_value,
        remark: String::new(),
        confidence: 1.0,
        page_number,
    })
}

/// Extract one record per page of a parsed bill, skipping pages without data.
#[must_use]
pub fn extract_invoice_records(doc: &ParsedDocument) -> Vec<InvoiceRecord> {
    doc.pages
        .iter()
        .filter_map(|page| extract_invoice_record(&page.text, page.page_number))
        .collect()
}
