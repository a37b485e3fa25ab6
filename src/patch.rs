//! Patch synthesis from cursor positions.
//!
//! The minimal applyable patch for a set of cursors is the concatenation of
//! each hit hunk's text, preceded by its file header, in buffer order and
//! with no span repeated.

use crate::buffer::Region;
use crate::index::{ParsedDiff, Span, span_text};

/// Build one patch string from the hunks under the given cursors.
///
/// Only point cursors participate; range selections are skipped. Cursors
/// outside every hunk are skipped as well, so the result is empty when no
/// cursor touches a hunk; callers surface that as "not within a hunk".
pub fn patch_for_cursors(text: &str, diff: &ParsedDiff, cursors: &[Region]) -> String {
    let mut spans: Vec<Span> = Vec::new();

    for cursor in cursors.iter().filter(|region| region.is_point()) {
        let Some((header, hunk)) = diff.head_and_hunk_for_offset(cursor.a) else {
            continue;
        };
        for span in [header, hunk] {
            if !spans.contains(&span) {
                spans.push(span);
            }
        }
    }

    spans.iter().map(|&span| span_text(text, span)).collect()
}
