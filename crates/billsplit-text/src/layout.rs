//! Line reconstruction from positioned text fragments
//!
//! Renderers emit fragments in visual reading order but do not mark line
//! boundaries. A jump in the vertical coordinate larger than
//! [`LINE_BREAK_THRESHOLD`] between consecutive fragments is taken as a line
//! break. This is a heuristic, not layout recovery: columns and tables come
//! out in whatever order the renderer emitted them.

use billsplit_core::TextFragment;

/// Vertical distance (in page units) above which a new line is started.
pub const LINE_BREAK_THRESHOLD: f32 = 5.0;

/// Rebuild page text from fragments using the default threshold.
///
/// Fragment text is appended verbatim: never trimmed and never padded with
/// spaces. Fragments without a vertical coordinate are treated as `y = 0`.
///
/// # Examples
///
/// ```rust
/// use billsplit_core::TextFragment;
/// use billsplit_text::reconstruct_lines;
///
/// let fragments = vec![
///     TextFragment::new("A", 100.0, 8.0),
///     TextFragment::new("B", 100.0, 8.0),
///     TextFragment::new("C", 50.0, 8.0),
/// ];
/// assert_eq!(reconstruct_lines(&fragments), "AB\nC");
/// ```
#[must_use]
pub fn reconstruct_lines(fragments: &[TextFragment]) -> String {
    reconstruct_lines_with_threshold(fragments, LINE_BREAK_THRESHOLD)
}

/// Rebuild page text from fragments with a custom line-break threshold.
#[must_use]
pub fn reconstruct_lines_with_threshold(fragments: &[TextFragment], threshold: f32) -> String {
    let capacity = fragments.iter().map(|f| f.text.len() + 1).sum();
    let mut text = String::with_capacity(capacity);
    let mut last_y: Option<f32> = None;

    for fragment in fragments {
        let y = fragment.y_or_zero();
        if let Some(previous) = last_y {
            if (y - previous).abs() > threshold {
                text.push('\n');
            }
        }
        text.push_str(&fragment.text);
        last_y = Some(y);
    }

    text
}
