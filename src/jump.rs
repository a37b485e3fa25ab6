//! Cursor-to-file coordinate translation.
//!
//! Maps a position inside a rendered hunk to the (row, column) it refers to
//! in the post-image file, so the host can open the file there. Deleted
//! content has no destination; the policy prefers the nearest following
//! addition, then the nearest following context line.

use crate::buffer::{Region, rowcol};
use crate::hunk::{LineMode, line_indentation, split_hunk};
use crate::index::{ParsedDiff, span_text};

/// A resolved "open file here" position, 1-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTarget {
    pub path: String,
    pub row: u32,
    pub col: u32,
}

/// (row, col) of `pt` relative to the hunk's first character; row 0 is the
/// `@@` line itself. Column 0 is the mode character, which has no file
/// equivalent, so it is pinned to 1.
pub fn relative_rowcol_in_hunk(text: &str, hunk_start: usize, pt: usize) -> (usize, usize) {
    let (head_row, _) = rowcol(text, hunk_start);
    let (pt_row, col) = rowcol(text, pt);
    (pt_row.saturating_sub(head_row), col.max(1))
}

/// Translate a hunk-relative (row, col) to the post-image file position.
///
/// Returns `None` when the hunk header does not parse or the row falls past
/// the hunk's parsed lines.
pub fn real_rowcol_in_hunk(hunk: &str, relative: (usize, usize)) -> Option<(u32, u32)> {
    let lines = split_hunk(hunk)?;
    if lines.is_empty() {
        return None;
    }

    let (mut row, mut col) = relative;

    // On the header line, pretend to be on the first visible line with some
    // content instead.
    if row == 0 {
        row = lines
            .iter()
            .position(|line| line.mode != LineMode::Deleted && !line.text.trim().is_empty())
            .map_or(1, |idx| idx + 1);
        col = 1;
    }

    let line = lines.get(row - 1)?;

    // Happy path: the cursor is on a line present in the file.
    if line.mode != LineMode::Deleted {
        return Some((line.line_number, col as u32));
    }

    // On a deleted line we cannot jump to; pick the next guaranteed to be
    // available line.
    for next in &lines[row..] {
        match next.mode {
            LineMode::Added => {
                let width = next.text.chars().count() + 1;
                return Some((next.line_number, col.min(width) as u32));
            }
            LineMode::Context => {
                // Only a contextual line follows; choose it or the previous
                // line depending on the indentation.
                let indent = line_indentation(next.text);
                return if indent == line_indentation(line.text) {
                    Some((next.line_number, indent as u32 + 1))
                } else {
                    Some((line.line_number.saturating_sub(1).max(1), 1))
                };
            }
            LineMode::Deleted => {}
        }
    }

    Some((line.line_number, 1))
}

/// Target file path from a header block's `+++ b/...` line
pub fn filename_from_header(header: &str) -> Option<&str> {
    header
        .lines()
        .find_map(|line| line.strip_prefix("+++ b/"))
        .filter(|path| !path.is_empty())
}

/// Resolve every point cursor to a file position, keeping the first target
/// per file
pub fn jump_targets(text: &str, diff: &ParsedDiff, cursors: &[Region]) -> Vec<JumpTarget> {
    let mut targets: Vec<JumpTarget> = Vec::new();

    for cursor in cursors.iter().filter(|region| region.is_point()) {
        let Some((header, hunk)) = diff.head_and_hunk_for_offset(cursor.a) else {
            continue;
        };
        let relative = relative_rowcol_in_hunk(text, hunk.0, cursor.a);
        let Some((row, col)) = real_rowcol_in_hunk(span_text(text, hunk), relative) else {
            continue;
        };
        let Some(path) = filename_from_header(span_text(text, header)) else {
            continue;
        };
        if targets.iter().any(|target| target.path == path) {
            continue;
        }
        targets.push(JumpTarget {
            path: path.to_string(),
            row,
            col,
        });
    }

    targets
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const HUNK: &str = "@@ -1,3 +1,4 @@\n line1\n+line2\n-line3\n line4\n";

    #[test]
    fn present_line_maps_directly() {
        // Row 2 is "+line2", b-side line 2.
        assert_eq!(real_rowcol_in_hunk(HUNK, (2, 3)), Some((2, 3)));
    }

    #[test]
    fn column_zero_is_pinned_before_translation() {
        let text = format!("prelude\n{HUNK}");
        let hunk_start = text.find("@@").unwrap();
        // Cursor directly on the '+' marker of "+line2".
        let pt = text.find("+line2").unwrap();
        assert_eq!(relative_rowcol_in_hunk(&text, hunk_start, pt), (2, 1));
    }

    #[test]
    fn header_row_retargets_to_first_content_line() {
        assert_eq!(real_rowcol_in_hunk(HUNK, (0, 7)), Some((1, 1)));

        // When the first body line is a deletion, skip to the next present
        // line instead.
        let deletion_first = "@@ -1,2 +1,1 @@\n-gone\n kept\n";
        assert_eq!(real_rowcol_in_hunk(deletion_first, (0, 4)), Some((1, 1)));
    }

    #[test]
    fn deleted_line_resolves_to_following_context() {
        // Row 3 is "-line3"; the next line is context "line4" with equal
        // indentation, so alignment lands there, never on line3 itself.
        assert_eq!(real_rowcol_in_hunk(HUNK, (3, 2)), Some((3, 1)));
    }

    #[test]
    fn deleted_line_prefers_following_addition() {
        let hunk = "@@ -5,2 +5,2 @@\n-removed\n+replacement\n ctx\n";
        // Column clamps to the addition's width + 1.
        assert_eq!(real_rowcol_in_hunk(hunk, (1, 80)), Some((5, 12)));
    }

    #[test]
    fn deleted_line_with_mismatched_context_indent_goes_up() {
        let hunk = "@@ -7,2 +7,1 @@\n-    indented\n bare\n";
        assert_eq!(real_rowcol_in_hunk(hunk, (1, 3)), Some((6, 1)));
    }

    #[test]
    fn trailing_deletion_keeps_its_anchor() {
        let hunk = "@@ -9,1 +8,0 @@\n-last one out\n";
        assert_eq!(real_rowcol_in_hunk(hunk, (1, 5)), Some((8, 1)));
    }

    #[test]
    fn unparseable_header_is_unmappable() {
        assert_eq!(real_rowcol_in_hunk("not a hunk\n+x\n", (1, 1)), None);
    }

    #[test]
    fn row_past_hunk_body_is_unmappable() {
        assert_eq!(real_rowcol_in_hunk(HUNK, (40, 1)), None);
    }

    #[test]
    fn filename_comes_from_b_side() {
        let header = "diff --git a/src/x.rs b/src/x.rs\nindex 111..222 100644\n--- a/src/x.rs\n+++ b/src/x.rs\n";
        assert_eq!(filename_from_header(header), Some("src/x.rs"));
        assert_eq!(filename_from_header("diff --git a/x b/x\n"), None);
    }

    #[test]
    fn jump_targets_deduplicate_per_file() {
        let text = "\
diff --git a/solo.rs b/solo.rs
index 1111111..2222222 100644
--- a/solo.rs
+++ b/solo.rs
@@ -1,2 +1,3 @@
 one
+two
 three
@@ -10,2 +11,3 @@
 ten
+eleven
 twelve
";
        let diff = ParsedDiff::parse(text);
        let cursors = vec![
            Region::point(text.find("+two").unwrap()),
            Region::point(text.find("+eleven").unwrap()),
        ];

        let targets = jump_targets(text, &diff, &cursors);
        assert_eq!(
            targets,
            vec![JumpTarget {
                path: "solo.rs".to_string(),
                row: 2,
                col: 1,
            }]
        );
    }
}
