//! Per-view diff session.
//!
//! All state for one rendered diff view lives here: the typed settings, the
//! undo stack, and the sticky failure flag. Operations take the repository
//! and buffer collaborators by reference and run to completion before
//! returning; `&mut self` exclusivity is what guarantees that a stage,
//! discard, or undo (external apply call, settings update, and refresh)
//! never interleaves with another operation on the same view. Offsets are
//! recomputed from the buffer snapshot at every call; none survive a
//! refresh.

use error_set::error_set;

use crate::apply::{ApplyArgs, UndoEntry};
use crate::buffer::{Buffer, Region};
use crate::git::{DiffSpec, Repo, RepoError};
use crate::index::{ParsedDiff, span_text};
use crate::jump::{JumpTarget, jump_targets};
use crate::patch::patch_for_cursors;
use crate::relocate::{find_hunk_in_view, relocate_cursors};

error_set! {
    /// Failures of diff-view operations.
    ///
    /// The plain variants are the non-fatal, user-visible kind: the host
    /// shows their message as a status line and moves on. `RepoError`
    /// carries external git failures verbatim.
    ViewOpError := {
        #[display("Not within a hunk")]
        NotInHunk,
        #[display("Undo stack is empty")]
        NothingToUndo,
        #[display("You have to be in a clean diff to stage")]
        DirtyDiff,
        #[display("Staging is disabled in this view")]
        StagingDisabled,
        RepoError(RepoError),
    }
}

/// Which refreshing toggle to flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffToggle {
    IgnoreWhitespace,
    WordDiff,
}

/// Typed per-view settings.
///
/// Every recognized key is a named field; the struct is owned by the view
/// and dies with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSettings {
    /// Showing the staged (index) diff instead of the working-tree diff
    pub cached_mode: bool,
    pub ignore_whitespace: bool,
    pub word_diff: bool,
    pub context_lines: u32,
    pub base_commit: Option<String>,
    pub target_commit: Option<String>,
    /// Restrict the diff to one file
    pub file_path: Option<String>,
    /// Read-only views (showing a commit range) cannot stage
    pub disable_stage: bool,
    /// Sticky: set on undecodable diff output, stops all further refreshes
    /// for this view until cleared externally
    pub diff_disabled: bool,
    /// Last applied patch, used as a relocation hint when flipping modes
    pub just_hunked: String,
    /// Cursor set saved when flipping cached mode
    pub last_cursors: Vec<Region>,
    /// Diff body of the last successful refresh
    pub raw_diff: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            cached_mode: false,
            ignore_whitespace: false,
            word_diff: false,
            context_lines: 3,
            base_commit: None,
            target_commit: None,
            file_path: None,
            disable_stage: false,
            diff_disabled: false,
            just_hunked: String::new(),
            last_cursors: Vec::new(),
            raw_diff: String::new(),
        }
    }
}

/// One diff view's session state and operations
#[derive(Debug, Default)]
pub struct DiffView {
    pub settings: ViewSettings,
    history: Vec<UndoEntry>,
}

impl DiffView {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            settings,
            history: Vec::new(),
        }
    }

    /// Depth of the undo stack
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn diff_spec(&self) -> DiffSpec<'_> {
        DiffSpec {
            cached: self.settings.cached_mode,
            ignore_whitespace: self.settings.ignore_whitespace,
            word_diff: self.settings.word_diff,
            context_lines: self.settings.context_lines,
            base_commit: self.settings.base_commit.as_deref(),
            target_commit: self.settings.target_commit.as_deref(),
            file_path: self.settings.file_path.as_deref(),
        }
    }

    fn render_prelude(&self) -> String {
        let mut prelude = String::from("\n");

        if let Some(file) = &self.settings.file_path {
            prelude.push_str(&format!("  FILE: {file}\n"));
        }

        let base = self.settings.base_commit.as_deref();
        let target = self.settings.target_commit.as_deref();
        if self.settings.disable_stage {
            if self.settings.cached_mode {
                prelude.push_str(&format!(
                    "  INDEX..{}\n",
                    base.or(target).unwrap_or_default()
                ));
            } else if let (Some(base), Some(target)) = (base, target) {
                prelude.push_str(&format!("  {base}..{target}\n"));
            } else {
                prelude.push_str(&format!(
                    "  WORKING DIR..{}\n",
                    base.or(target).unwrap_or_default()
                ));
            }
        } else if self.settings.cached_mode {
            prelude.push_str("  STAGED CHANGES (Will commit)\n");
        } else {
            prelude.push_str("  UNSTAGED CHANGES\n");
        }

        if self.settings.ignore_whitespace {
            prelude.push_str("  IGNORING WHITESPACE\n");
        }

        prelude
    }

    /// Recompute the diff and replace the buffer content.
    ///
    /// Undecodable diff output permanently disables refreshing for this
    /// view instead of looping on the error; the existing content stays
    /// visible. The first successful render moves the cursor to the first
    /// hunk.
    pub fn refresh(&mut self, repo: &dyn Repo, buffer: &mut dyn Buffer) -> Result<(), ViewOpError> {
        if self.settings.diff_disabled {
            log::debug!("diff refresh skipped: view is disabled");
            return Ok(());
        }

        let diff = match repo.compute_diff(&self.diff_spec()) {
            Ok(diff) => diff,
            Err(RepoError::InvalidUtf8 { message }) => {
                log::warn!("disabling diff view: {message}");
                self.settings.diff_disabled = true;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let first_render = self.settings.raw_diff.is_empty();
        let text = format!("{}\n--\n{diff}", self.render_prelude());
        self.settings.raw_diff = diff;
        buffer.replace_all(text);

        if first_render {
            let parsed = ParsedDiff::parse(buffer.text());
            if let Some(&(start, _)) = parsed.hunks.first() {
                buffer.set_selection(vec![Region::point(start)]);
            }
        }

        Ok(())
    }

    /// Stage (`reset = false`) or discard (`reset = true`) the hunks under
    /// the current cursors.
    ///
    /// The apply call, the undo recording, and the refresh run as one
    /// atomic unit; the undo entry is recorded only after the apply
    /// succeeded.
    pub fn stage_or_reset_hunks(
        &mut self,
        repo: &dyn Repo,
        buffer: &mut dyn Buffer,
        reset: bool,
    ) -> Result<(), ViewOpError> {
        if self.settings.ignore_whitespace || self.settings.word_diff {
            return Err(ViewOpError::DirtyDiff);
        }
        if self.settings.disable_stage {
            return Err(ViewOpError::StagingDisabled);
        }

        let Some(args) = ApplyArgs::for_intent(
            self.settings.cached_mode,
            reset,
            self.settings.context_lines == 0,
        ) else {
            log::debug!("stage in cached mode is not a valid state; ignoring");
            return Ok(());
        };

        let cursors: Vec<Region> = buffer
            .selection()
            .iter()
            .copied()
            .filter(Region::is_point)
            .collect();
        let text = buffer.text().to_string();
        let diff = ParsedDiff::parse(&text);
        let patch = patch_for_cursors(&text, &diff, &cursors);
        if patch.is_empty() {
            return Err(ViewOpError::NotInHunk);
        }

        repo.apply_patch(args, &patch)?;

        self.history.push(UndoEntry {
            args,
            patch: patch.clone(),
            cursors,
            was_cached_mode: self.settings.cached_mode,
        });
        self.settings.just_hunked = patch;

        self.refresh(repo, buffer)
    }

    /// Undo the most recent stage/discard by replaying its patch with the
    /// direction flipped.
    pub fn undo_last(
        &mut self,
        repo: &dyn Repo,
        buffer: &mut dyn Buffer,
    ) -> Result<(), ViewOpError> {
        let Some(entry) = self.history.pop() else {
            return Err(ViewOpError::NothingToUndo);
        };

        if let Err(err) = repo.apply_patch(entry.args.reversed(), &entry.patch) {
            // Nothing was undone; keep the entry for another attempt.
            self.history.push(entry);
            return Err(err.into());
        }

        let cursors = entry.cursors;
        let was_cached_mode = entry.was_cached_mode;
        self.settings.just_hunked = entry.patch;

        self.refresh(repo, buffer)?;

        // The recorded cursors only apply if we're still on the same side.
        if self.settings.cached_mode == was_cached_mode {
            buffer.set_selection(cursors);
        }

        Ok(())
    }

    /// Flip between the working-tree and index diff, or swap base and
    /// target when the view shows a commit range.
    ///
    /// After the flip, focus returns to the last applied hunk when there is
    /// one, otherwise to the cursor set saved by the previous flip.
    pub fn toggle_cached_mode(
        &mut self,
        repo: &dyn Repo,
        buffer: &mut dyn Buffer,
    ) -> Result<(), ViewOpError> {
        if self.settings.base_commit.is_some() && self.settings.target_commit.is_some() {
            std::mem::swap(
                &mut self.settings.base_commit,
                &mut self.settings.target_commit,
            );
            return self.refresh(repo, buffer);
        }

        let last_cursors = std::mem::replace(
            &mut self.settings.last_cursors,
            buffer.selection().to_vec(),
        );
        self.settings.cached_mode = !self.settings.cached_mode;

        self.refresh(repo, buffer)?;

        // `last_cursors` is only empty on the very first flip: if the user
        // hunked and then switches to see what will actually be committed,
        // focus the hunk they just applied.
        if !self.settings.just_hunked.is_empty() && !last_cursors.is_empty() {
            let just_hunked = std::mem::take(&mut self.settings.just_hunked);
            if let Some(pt) = find_hunk_in_view(buffer, &just_hunked) {
                buffer.set_selection(vec![Region::point(pt)]);
                return Ok(());
            }
        }

        if !last_cursors.is_empty() {
            buffer.set_selection(last_cursors);
        }

        Ok(())
    }

    /// Flip one of the diff-shaping toggles and refresh. Returns the new
    /// value for the host's status message.
    pub fn toggle_setting(
        &mut self,
        repo: &dyn Repo,
        buffer: &mut dyn Buffer,
        toggle: DiffToggle,
    ) -> Result<bool, ViewOpError> {
        let value = match toggle {
            DiffToggle::IgnoreWhitespace => {
                self.settings.ignore_whitespace = !self.settings.ignore_whitespace;
                self.settings.ignore_whitespace
            }
            DiffToggle::WordDiff => {
                self.settings.word_diff = !self.settings.word_diff;
                self.settings.word_diff
            }
        };
        self.refresh(repo, buffer)?;
        Ok(value)
    }

    /// Change the context-line count by `amount` (floored at zero) and keep
    /// the cursors on the same logical hunks.
    ///
    /// The hunks under the cursors are extracted verbatim before the
    /// refresh and relocated in the regenerated content afterwards; cursors
    /// whose hunks cannot be found again fall back to the buffer start.
    pub fn adjust_context_lines(
        &mut self,
        repo: &dyn Repo,
        buffer: &mut dyn Buffer,
        amount: i32,
    ) -> Result<(), ViewOpError> {
        self.settings.context_lines = self.settings.context_lines.saturating_add_signed(amount);

        let text = buffer.text().to_string();
        let diff = ParsedDiff::parse(&text);
        let anchors: Vec<String> = buffer
            .selection()
            .iter()
            .filter_map(|cursor| diff.head_and_hunk_for_offset(cursor.a))
            .map(|(header, hunk)| format!("{}{}", span_text(&text, header), span_text(&text, hunk)))
            .collect();

        self.refresh(repo, buffer)?;

        let relocated = relocate_cursors(buffer, &anchors);
        if relocated.is_empty() {
            buffer.set_selection(vec![Region::point(0)]);
        } else {
            buffer.set_selection(relocated.into_iter().map(Region::point).collect());
        }

        Ok(())
    }

    /// Move the cursor to the next (or previous) hunk header, wrapping
    /// around at the ends.
    pub fn navigate_hunk(&self, buffer: &mut dyn Buffer, forward: bool) {
        let from = buffer
            .selection()
            .first()
            .map(|region| region.begin())
            .unwrap_or_default();
        let diff = ParsedDiff::parse(buffer.text());
        let dest = if forward {
            diff.next_hunk_start(from)
        } else {
            diff.prev_hunk_start(from)
        };
        if let Some(pt) = dest {
            buffer.set_selection(vec![Region::point(pt)]);
        }
    }

    /// Post-image file positions for the hunks under the current cursors,
    /// first target per file
    pub fn jump_targets(&self, buffer: &dyn Buffer) -> Vec<JumpTarget> {
        let diff = ParsedDiff::parse(buffer.text());
        jump_targets(buffer.text(), &diff, buffer.selection())
    }
}
