//! Offset index over a rendered diff buffer.
//!
//! One pass over the text locates every file header and hunk as a byte span.
//! The spans are only valid against the exact snapshot they were computed
//! from; callers reparse after every buffer mutation.

use crate::buffer::Region;

/// Half-open `(start, end)` byte range
pub type Span = (usize, usize);

/// File-header and hunk spans of one buffer snapshot, both sorted by start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDiff {
    /// Each covers a `diff ...` line through its `+++` line inclusive
    pub headers: Vec<Span>,
    /// Each covers an `@@` line up to the next hunk/header boundary
    pub hunks: Vec<Span>,
}

impl ParsedDiff {
    /// Index `text`. Content without diff markers (a prelude, a clean tree)
    /// yields empty spans; that is a normal outcome, not an error.
    pub fn parse(text: &str) -> Self {
        let mut header_starts = Vec::new();
        let mut header_ends = Vec::new();
        let mut hunk_starts = Vec::new();

        let mut offset = 0;
        let mut after_file_header = false;
        for line in text.split_inclusive('\n') {
            if line.starts_with("diff") {
                header_starts.push(offset);
            }
            if line.starts_with("@@") {
                // The header span ends where the first hunk begins.
                if after_file_header {
                    header_ends.push(offset);
                }
                hunk_starts.push(offset);
            }
            after_file_header = line.starts_with("+++");
            offset += line.len();
        }

        // A hunk is closed by the next file's header, by the next hunk start
        // (unless that start doubles as a header end, i.e. the hunk opens a
        // new file), or by the end of the buffer for the last one.
        let mut hunk_ends: Vec<usize> = header_starts
            .iter()
            .skip(1)
            .chain(hunk_starts.iter().filter(|start| !header_ends.contains(*start)))
            .copied()
            .chain(std::iter::once(text.len() + 1))
            .collect();
        hunk_ends.sort_unstable();
        hunk_ends.dedup();

        ParsedDiff {
            headers: header_starts.into_iter().zip(header_ends).collect(),
            hunks: hunk_starts.into_iter().zip(hunk_ends).collect(),
        }
    }

    /// The hunk containing `offset` and its owning header.
    ///
    /// Returns `None` when the offset is outside every hunk, a frequent
    /// normal outcome. A hunk without any preceding header means the buffer
    /// is not a diff this parser understands and panics.
    #[allow(clippy::panic)]
    pub fn head_and_hunk_for_offset(&self, offset: usize) -> Option<(Span, Span)> {
        let hunk = self
            .hunks
            .iter()
            .copied()
            .find(|&(start, end)| start <= offset && offset < end)?;

        let header = self.headers.iter().copied().filter(|&h| h < hunk).max();
        match header {
            Some(header) => Some((header, hunk)),
            None => panic!(
                "hunk at {}..{} has no preceding file header",
                hunk.0, hunk.1
            ),
        }
    }

    /// Hunk spans intersecting a selection region; a point cursor hits the
    /// hunk it sits in
    pub fn hunks_intersecting(&self, region: Region) -> impl Iterator<Item = Span> + '_ {
        let begin = region.begin();
        let end = if region.is_point() { begin + 1 } else { region.end() };
        self.hunks
            .iter()
            .copied()
            .filter(move |&(start, stop)| start < end && begin < stop)
    }

    /// Start offset of the first hunk after `offset`, wrapping to the first
    /// hunk at the end of the buffer
    pub fn next_hunk_start(&self, offset: usize) -> Option<usize> {
        self.hunks
            .iter()
            .map(|&(start, _)| start)
            .find(|&start| start > offset)
            .or_else(|| self.hunks.first().map(|&(start, _)| start))
    }

    /// Start offset of the last hunk before `offset`, wrapping to the last
    /// hunk at the top of the buffer
    pub fn prev_hunk_start(&self, offset: usize) -> Option<usize> {
        self.hunks
            .iter()
            .map(|&(start, _)| start)
            .filter(|&start| start < offset)
            .next_back()
            .or_else(|| self.hunks.last().map(|&(start, _)| start))
    }
}

/// Literal text of a span, clamped to the buffer (the final hunk's end is
/// one past the buffer length)
pub fn span_text<'a>(text: &'a str, span: Span) -> &'a str {
    &text[span.0.min(text.len())..span.1.min(text.len())]
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Assemble a syntactically valid multi-file diff from generated shape
    fn render_diff(files: &[(u8, Vec<u8>)]) -> String {
        let mut text = String::from("\n  UNSTAGED CHANGES\n\n--\n");
        for (file_idx, (name_salt, hunks)) in files.iter().enumerate() {
            let name = format!("file_{file_idx}_{name_salt}.rs");
            text.push_str(&format!(
                "diff --git a/{name} b/{name}\nindex 0000000..1111111 100644\n--- a/{name}\n+++ b/{name}\n"
            ));
            for (hunk_idx, lines) in hunks.iter().enumerate() {
                let start = (hunk_idx + 1) * 10;
                text.push_str(&format!("@@ -{start},{lines} +{start},{lines} @@\n"));
                for line in 0..*lines {
                    text.push_str(&format!(" context {line}\n"));
                }
            }
        }
        text
    }

    proptest! {
        #[test]
        fn parsed_spans_hold_invariants(
            files in prop::collection::vec(
                (0u8..100, prop::collection::vec(1u8..4, 1..4)),
                1..4,
            )
        ) {
            let text = render_diff(&files);
            let diff = ParsedDiff::parse(&text);

            let total_hunks: usize = files.iter().map(|(_, hunks)| hunks.len()).sum();
            prop_assert_eq!(diff.headers.len(), files.len());
            prop_assert_eq!(diff.hunks.len(), total_hunks);

            // Sorted and non-overlapping within each category.
            for pair in diff.headers.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].0);
            }
            for pair in diff.hunks.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].0);
            }

            // Every offset strictly inside a hunk resolves to that hunk and
            // a header that precedes it.
            for &hunk in &diff.hunks {
                let (header, found) = diff.head_and_hunk_for_offset(hunk.0).unwrap();
                prop_assert_eq!(found, hunk);
                prop_assert!(header.1 <= hunk.0);
            }
        }
    }
}
