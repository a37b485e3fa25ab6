//! Cursor relocation after the buffer is regenerated.
//!
//! Offsets are meaningless across a content refresh; the only stable anchor
//! is the content itself. Each cursor's hunk text is captured before the
//! mutation and searched for afterwards: first the hunk header line
//! verbatim, then the body with its context shrunk symmetrically until
//! something still present matches.

use crate::buffer::Buffer;

/// Locate the first hunk of `patch` in the buffer.
///
/// Returns the offset of that hunk's `@@` line, if any.
pub fn find_hunk_in_view(buffer: &dyn Buffer, patch: &str) -> Option<usize> {
    let lines = extract_first_hunk(patch)?;
    buffer
        .find_literal(lines[0])
        .or_else(|| fuzzy_find_hunk_content(buffer, &lines[1..]))
}

/// First hunk of a patch as lines: the `@@` line plus its body
fn extract_first_hunk(patch: &str) -> Option<Vec<&str>> {
    let mut rest = patch.split('\n').skip_while(|line| !line.starts_with("@@ "));
    let start = rest.next()?;

    let mut lines = vec![start];
    lines.extend(rest.take_while(|line| !line.starts_with("@@ ")));
    Some(lines)
}

/// Search for the hunk body, dropping one context line from each end per
/// round. The body no longer includes the `@@` line, so a match is walked
/// back to the nearest preceding hunk header.
fn fuzzy_find_hunk_content(buffer: &dyn Buffer, lines: &[&str]) -> Option<usize> {
    let mut window = lines;
    while !window.is_empty() {
        if let Some(pt) = buffer.find_literal(&window.join("\n")) {
            return hunk_start_before(buffer.text(), pt);
        }
        // Two or fewer lines left means nothing remains after the trim.
        window = if window.len() <= 2 {
            &[]
        } else {
            &window[1..window.len() - 1]
        };
    }
    None
}

/// Offset of the nearest line before `pt` that starts a hunk
fn hunk_start_before(text: &str, pt: usize) -> Option<usize> {
    let line_start = text[..pt.min(text.len())].rfind('\n').map_or(0, |i| i + 1);

    let mut starts = Vec::new();
    let mut offset = 0;
    for line in text[..line_start].split_inclusive('\n') {
        starts.push(offset);
        offset += line.len();
    }

    starts
        .into_iter()
        .rev()
        .find(|&start| text[start..].starts_with("@@ "))
}

/// Relocate every anchor in the refreshed buffer.
///
/// Anchors that no longer match anywhere are dropped; the order of the
/// returned offsets is not significant.
pub fn relocate_cursors(buffer: &dyn Buffer, anchors: &[String]) -> Vec<usize> {
    let mut offsets: Vec<usize> = anchors
        .iter()
        .filter_map(|anchor| find_hunk_in_view(buffer, anchor))
        .collect();
    offsets.sort_unstable();
    offsets.dedup();
    offsets
}
