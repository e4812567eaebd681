//! Extracted entity records

use serde::{Deserialize, Serialize};

/// Identifiers recovered from a document's full text.
///
/// Each field holds the first confident match, or `None` when no strategy
/// matched. A missing entity is a normal outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtractedEntities {
    /// Passenger name following a masked ID number
    pub person_name: Option<String>,
    /// Labelled e-ticket number
    pub ticket_number: Option<String>,
    /// 20-digit invoice number
    pub invoice_number: Option<String>,
}

impl ExtractedEntities {
    /// True when no entity was found.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.person_name.is_none() && self.ticket_number.is_none() && self.invoice_number.is_none()
    }
}

/// Outcome of combining a person name and a filename suffix into a new name.
///
/// `new_name` is `None` when either half is missing; the caller must then
/// keep `original_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenameDecision {
    /// Name the document arrived with
    pub original_name: String,
    /// Synthesised name, if both halves were extracted
    pub new_name: Option<String>,
}

impl RenameDecision {
    /// Name to use when writing the document out.
    #[inline]
    #[must_use]
    pub fn effective_name(&self) -> &str {
        self.new_name.as_deref().unwrap_or(&self.original_name)
    }

    /// Whether a new name is available.
    #[inline]
    #[must_use]
    pub const fn is_renamed(&self) -> bool {
        self.new_name.is_some()
    }
}

/// Merged ticket/invoice record for one page of a bill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// 13-character e-ticket number cut from the longest code run
    pub ticket_number: Option<String>,
    /// 20-digit invoice number
    pub invoice_number: Option<String>,
    /// Ticket number if present, otherwise the invoice number; used for matching
    pub original_value: Option<String>,
    /// Free-form remark, currently never extracted
    pub remark: String,
    /// Extraction confidence; direct pattern hits score 1.0
    pub confidence: f32,
    /// 1-based page the record was found on
    pub page_number: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_name_falls_back_to_original() {
        let decision = RenameDecision {
            original_name: "a.pdf".to_string(),
            new_name: None,
        };
        assert_eq!(decision.effective_name(), "a.pdf");
        assert!(!decision.is_renamed());
    }

    #[test]
    fn test_entities_empty() {
        assert!(ExtractedEntities::default().is_empty());
        let entities = ExtractedEntities {
            ticket_number: Some("1".to_string()),
            ..ExtractedEntities::default()
        };
        assert!(!entities.is_empty());
    }
}
