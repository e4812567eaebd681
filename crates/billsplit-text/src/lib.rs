//! # billsplit-text - Text reconstruction and entity extraction
//!
//! Two pure stages of the bill pipeline:
//!
//! - [`layout`] turns a page's positioned fragments into lines.
//! - [`entities`] and [`invoice`] recover passenger names, ticket numbers,
//!   invoice numbers and file-name suffixes from the reconstructed text.
//!
//! Nothing here performs I/O; every function is a function of its input.

pub mod entities;
pub mod invoice;
pub mod layout;

pub use entities::{
    decide_rename, extract_entities, extract_file_suffix, extract_invoice_number,
    extract_person_name, extract_ticket_number, first_match, strip_whitespace, synthesize_name,
    Matcher, PERSON_NAME_STRATEGIES, TICKET_NUMBER_STRATEGIES,
};
pub use invoice::{extract_invoice_record, extract_invoice_records};
pub use layout::{reconstruct_lines, reconstruct_lines_with_threshold, LINE_BREAK_THRESHOLD};
