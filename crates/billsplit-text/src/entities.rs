//! Entity extraction from reconstructed document text
//!
//! Every entity is recovered by an ordered list of matchers tried until one
//! returns a value. Matchers are pure functions of the input text.

use billsplit_core::{ExtractedEntities, RenameDecision};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// A single extraction strategy.
pub type Matcher = fn(&str) -> Option<String>;

/// Marker phrase that may directly follow a passenger name.
pub const NAME_TERMINATOR: &str = "电子客票号";

/// Extension appended when the original file name has none.
const DEFAULT_EXTENSION: &str = "pdf";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\p{Cc}]+").expect("valid regex"));

/// 18-char ID with check character, 4-6 mask characters, 3-4 trailing ID chars, 2-4 CJK name chars.
static STRICT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]{17}[0-9Xx]\*{4,6}[0-9Xx]{3,4}([\x{4e00}-\x{9fa5}]{2,4})").expect("valid regex")
});

/// Any digit run, at least 4 mask characters, any ID tail, 2-4 CJK name chars.
static LOOSE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+\*{4,}[0-9Xx]+([\x{4e00}-\x{9fa5}]{2,4})").expect("valid regex")
});

static TICKET_LABELLED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"电子客票号码?\s*[:：]\s*([0-9]+)").expect("valid regex"));

static TICKET_SHORT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"客票号码?\s*[:：]\s*([0-9]+)").expect("valid regex"));

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

static PDF_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.pdf$").expect("valid regex"));

/// Length of an invoice number.
pub const INVOICE_NUMBER_LEN: usize = 20;

/// Person-name strategies, most specific first.
pub const PERSON_NAME_STRATEGIES: &[Matcher] = &[strict_person_name, loose_person_name];

/// Ticket-number strategies, most specific first.
pub const TICKET_NUMBER_STRATEGIES: &[Matcher] = &[labelled_ticket_number, short_label_ticket_number];

/// Run matchers in order and return the first hit.
#[inline]
#[must_use]
pub fn first_match(matchers: &[Matcher], text: &str) -> Option<String> {
    matchers.iter().find_map(|matcher| matcher(text))
}

/// Remove all whitespace and control characters.
#[must_use]
pub fn strip_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, "").into_owned()
}

/// Whether the text after a candidate name ends the name.
fn is_name_boundary(rest: &str) -> bool {
    rest.is_empty()
        || rest.starts_with(NAME_TERMINATOR)
        || rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Find the first name captured by `pattern` that is followed by a boundary.
///
/// The name group is tried longest first and shortened one character at a
/// time, so `肖烨电子客票号` yields `肖烨` rather than `肖烨电子`. If no
/// length works the search resumes one character after the match start.
fn bounded_name(pattern: &Regex, text: &str) -> Option<String> {
    let mut start = 0;
    while start <= text.len() {
        let caps = pattern.captures_at(text, start)?;
        let whole = caps.get(0)?;
        let name = caps.get(1)?;

        let offsets: Vec<usize> = name
            .as_str()
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(name.len()))
            .collect();
        for chars in (2..offsets.len()).rev() {
            let end = name.start() + offsets[chars];
            if is_name_boundary(&text[end..]) {
                return Some(text[name.start()..end].to_string());
            }
        }

        start = whole.start() + text[whole.start()..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

/// Name after a full 18-character masked ID.
#[must_use]
pub fn strict_person_name(text: &str) -> Option<String> {
    bounded_name(&STRICT_NAME, text)
}

/// Name after any digit/mask run.
#[must_use]
pub fn loose_person_name(text: &str) -> Option<String> {
    bounded_name(&LOOSE_NAME, text)
}

/// Extract the passenger name following a masked ID number.
///
/// All whitespace is removed before matching, so names split across
/// fragments or lines are still found.
///
/// # Examples
///
/// ```rust
/// use billsplit_text::extract_person_name;
///
/// let name = extract_person_name("4202221988****5775 肖烨\n电子客票号:658007");
/// assert_eq!(name.as_deref(), Some("肖烨"));
/// ```
#[must_use]
pub fn extract_person_name(text: &str) -> Option<String> {
    let cleaned = strip_whitespace(text);
    let name = first_match(PERSON_NAME_STRATEGIES, &cleaned);
    match &name {
        Some(name) => debug!("Extracted person name: {name}"),
        None => debug!("No person name found"),
    }
    name
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Ticket number after the full `电子客票号` label.
#[must_use]
pub fn labelled_ticket_number(text: &str) -> Option<String> {
    first_capture(&TICKET_LABELLED, text)
}

/// Ticket number after the shorter `客票号` label.
#[must_use]
pub fn short_label_ticket_number(text: &str) -> Option<String> {
    first_capture(&TICKET_SHORT_LABEL, text)
}

/// Extract the labelled e-ticket number.
///
/// # Examples
///
/// ```rust
/// use billsplit_text::extract_ticket_number;
///
/// let ticket = extract_ticket_number("电子客票号:6580074086121798365302025");
/// assert_eq!(ticket.as_deref(), Some("6580074086121798365302025"));
/// ```
#[must_use]
pub fn extract_ticket_number(text: &str) -> Option<String> {
    let ticket = first_match(TICKET_NUMBER_STRATEGIES, text);
    match &ticket {
        Some(ticket) => debug!("Extracted ticket number: {ticket}"),
        None => debug!("No ticket number found"),
    }
    ticket
}

/// Maximal digit runs of exactly `len` digits, in text order.
pub fn digit_runs_of_len(text: &str, len: usize) -> impl Iterator<Item = &str> {
    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(move |run| run.len() == len)
}

/// Extract the first standalone 20-digit invoice number.
///
/// Whitespace is kept here: line breaks separate the invoice number from
/// neighbouring digit runs such as ID numbers.
#[must_use]
pub fn extract_invoice_number(text: &str) -> Option<String> {
    digit_runs_of_len(text, INVOICE_NUMBER_LEN)
        .next()
        .map(str::to_string)
}

/// Extract the numeric suffix of a file name.
///
/// The `.pdf` extension is removed first. If the remaining name has an
/// underscore after its first character, the part after the last
/// underscore is used when it is all digits. Otherwise the first digit run
/// anywhere in the name is used.
///
/// # Examples
///
/// ```rust
/// use billsplit_text::extract_file_suffix;
///
/// assert_eq!(
///     extract_file_suffix("18812330_26329166851000023784.pdf").as_deref(),
///     Some("26329166851000023784")
/// );
/// assert_eq!(extract_file_suffix("report123.pdf").as_deref(), Some("123"));
/// assert_eq!(extract_file_suffix("report.pdf"), None);
/// ```
#[must_use]
pub fn extract_file_suffix(file_name: &str) -> Option<String> {
    let stem = PDF_EXTENSION.replace(file_name, "");

    if let Some(idx) = stem.rfind('_').filter(|&idx| idx > 0) {
        let tail = &stem[idx + 1..];
        if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
            debug!("Extracted file suffix: {tail}");
            return Some(tail.to_string());
        }
    }

    let suffix = DIGIT_RUN.find(&stem).map(|m| m.as_str().to_string());
    match &suffix {
        Some(suffix) => debug!("Extracted file suffix: {suffix}"),
        None => debug!("No file suffix in '{file_name}'"),
    }
    suffix
}

/// Extract all entities from a document's full text.
#[must_use]
pub fn extract_entities(full_text: &str) -> ExtractedEntities {
    ExtractedEntities {
        person_name: extract_person_name(full_text),
        ticket_number: extract_ticket_number(full_text),
        invoice_number: extract_invoice_number(full_text),
    }
}

/// Build `{person_name}_{suffix}.{ext}` from the original file's extension.
#[must_use]
pub fn synthesize_name(person_name: &str, suffix: &str, original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_EXTENSION);
    format!("{person_name}_{suffix}.{ext}")
}

/// Decide the new name of a document from an already extracted person name.
///
/// `new_name` is only set when both the person name and the file suffix
/// are available.
///
/// # Examples
///
/// ```rust
/// use billsplit_text::decide_rename;
///
/// let decision = decide_rename("18812330_26329166851000023784.pdf", Some("肖烨"));
/// assert_eq!(decision.new_name.as_deref(), Some("肖烨_26329166851000023784.pdf"));
///
/// let skipped = decide_rename("18812330_26329166851000023784.pdf", None);
/// assert_eq!(skipped.new_name, None);
/// ```
#[must_use]
pub fn decide_rename(original_name: &str, person_name: Option<&str>) -> RenameDecision {
    let new_name = person_name.and_then(|name| {
        let base = Path::new(original_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(original_name);
        extract_file_suffix(base).map(|suffix| synthesize_name(name, &suffix, base))
    });
    match &new_name {
        Some(new_name) => debug!("Rename {original_name} -> {new_name}"),
        None => debug!("Rename unavailable for {original_name}"),
    }
    RenameDecision {
        original_name: original_name.to_string(),
        new_name,
    }
}
