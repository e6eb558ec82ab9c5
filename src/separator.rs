//! Separate adjacent footnote markers
//!
//! `[^1][^2]` renders as an unreadable "12" in most Markdown outputs, so a
//! superscript comma goes between every pair of touching markers.

use crate::edit::{self, Replacement};
use regex::Regex;
use std::sync::LazyLock;

/// Inserted between two adjacent markers. Contains no `[^`, so it can never
/// be mistaken for a marker on a later pass.
pub const SEPARATOR: &str = "<sup>,</sup>";

/// Two markers with nothing in between
static MARKER_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\[\^[^\]\s]+\])(\[\^[^\]\s]+\])").unwrap());

/// One non-overlapping pass: each match covers two adjacent markers.
///
/// For a run `[^a][^b][^c]` this only sees `[^a][^b]`; the second marker of a
/// pair is consumed, so `[^b][^c]` is left for the next pass.
pub fn find_adjacent_markers(text: &str) -> Vec<Replacement> {
    MARKER_PAIR
        .captures_iter(text)
        .map(|cap| {
            let whole = cap.get(0).map_or(0..0, |m| m.range());
            Replacement {
                range: whole,
                text: format!("{}{}{}", &cap[1], SEPARATOR, &cap[2]),
            }
        })
        .collect()
}

/// Insert separators until no adjacent markers remain.
///
/// Returns the new text and the number of separators inserted. A run of N
/// markers gets exactly N-1 separators; running this on its own output
/// inserts nothing.
pub fn separate_markers(text: &str) -> (String, usize) {
    let mut current = text.to_string();
    let mut inserted = 0;

    loop {
        let pass = find_adjacent_markers(&current);
        if pass.is_empty() {
            break;
        }
        inserted += pass.len();
        current = edit::apply(&current, &pass);
    }

    (current, inserted)
}
