//! Per-line model of a single hunk.
//!
//! A hunk's body lines are resolved against the b-side (post-image) of the
//! diff: every line carries the 1-based line number it occupies in the new
//! file. Deleted lines have no b-side position of their own, so they carry
//! the number of the nearest following retained line and do not advance the
//! counter.

use nom::IResult;
use nom::Parser;
use nom::bytes::complete::tag;
use nom::character::complete::{char, u32 as dec_u32};
use nom::combinator::opt;
use nom::sequence::preceded;

/// How a single hunk line changes the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Line added on the b-side (`+`)
    Added,
    /// Line removed from the a-side (`-`)
    Deleted,
    /// Unchanged context line (` `)
    Context,
}

impl LineMode {
    fn from_marker(c: char) -> Self {
        match c {
            '+' => LineMode::Added,
            '-' => LineMode::Deleted,
            // Anything else (context, "\ No newline" marker) counts as
            // retained for line numbering purposes.
            _ => LineMode::Context,
        }
    }
}

/// One body line of a hunk with its resolved b-side line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkLine<'a> {
    pub mode: LineMode,
    /// Line content without the leading mode character
    pub text: &'a str,
    /// 1-based line number on the b-side; for deletions, the number of the
    /// nearest following retained line
    pub line_number: u32,
}

/// Parse the start of a `N` or `N,len` range
fn range_start(input: &str) -> IResult<&str, u32> {
    let (input, start) = dec_u32(input)?;
    let (input, _) = opt(preceded(char(','), dec_u32)).parse(input)?;
    Ok((input, start))
}

/// Parse a `@@ -oldStart[,oldLen] +newStart[,newLen] @@` header line,
/// returning `(old_start, new_start)`. Returns `None` when the line does
/// not match the grammar.
pub fn parse_hunk_header(line: &str) -> Option<(u32, u32)> {
    let (_, (_, old_start, _, new_start, _)) =
        (tag("@@ -"), range_start, tag(" +"), range_start, tag(" @@"))
            .parse(line)
            .ok()?;
    Some((old_start, new_start))
}

/// Split a hunk (header line included) into [`HunkLine`]s.
///
/// Returns `None` when the first line is not a valid hunk header.
pub fn split_hunk(hunk: &str) -> Option<Vec<HunkLine<'_>>> {
    let mut lines = hunk.trim_end().split('\n');
    let head = lines.next()?;
    let (_, new_start) = parse_hunk_header(head)?;
    Some(recount_lines(lines, new_start))
}

fn recount_lines<'a>(lines: impl Iterator<Item = &'a str>, start: u32) -> Vec<HunkLine<'a>> {
    let mut b = start;
    lines
        .map(|line| {
            let mut chars = line.chars();
            let (mode, text) = match chars.next() {
                Some(marker) => (LineMode::from_marker(marker), chars.as_str()),
                None => (LineMode::Context, line),
            };
            let resolved = HunkLine {
                mode,
                text,
                line_number: b,
            };
            if mode != LineMode::Deleted {
                b += 1;
            }
            resolved
        })
        .collect()
}

/// Number of leading whitespace characters
pub fn line_indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
