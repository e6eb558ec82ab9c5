//! Span replacements over a document
//!
//! Both rewriting passes first collect what to change, then build a new copy
//! of the document in one go.

use std::ops::Range;

/// Replace the bytes in `range` with `text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub range: Range<usize>,
    pub text: String,
}

/// Build a new document with every replacement applied.
///
/// Replacements must be sorted by start offset and must not overlap.
pub fn apply(source: &str, replacements: &[Replacement]) -> String {
    let extra: usize = replacements.iter().map(|r| r.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut cursor = 0;

    for r in replacements {
        debug_assert!(r.range.start >= cursor, "overlapping replacement");
        out.push_str(&source[cursor..r.range.start]);
        out.push_str(&r.text);
        cursor = r.range.end;
    }

    out.push_str(&source[cursor..]);
    out
}
