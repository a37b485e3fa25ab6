//! Apply-argument selection and undo bookkeeping.
//!
//! Three argument combinations cover the valid user intents:
//!
//! 1. Non-cached view, stage: apply forward, against the index only.
//! 2. Non-cached view, discard: apply in reverse, against the index and
//!    the working tree.
//! 3. Cached view, discard: apply in reverse, against the index only.
//!
//! A cached view with stage intent is not a valid state; nothing happens.

use crate::buffer::Region;

/// Where the patch lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyTarget {
    /// Index only (`--cached`)
    Index,
    /// Index and working tree together (`--index`)
    IndexAndWorktree,
}

/// Fully resolved arguments for one patch application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyArgs {
    pub reverse: bool,
    pub target: ApplyTarget,
    /// Zero-context patches need relaxed matching (`--unidiff-zero`)
    pub zero_context: bool,
}

impl ApplyArgs {
    /// Resolve the decision table; `None` means the intent is a no-op.
    pub fn for_intent(cached_mode: bool, reset: bool, zero_context: bool) -> Option<Self> {
        let (reverse, target) = match (cached_mode, reset) {
            (false, false) => (false, ApplyTarget::Index),
            (false, true) => (true, ApplyTarget::IndexAndWorktree),
            (true, true) => (true, ApplyTarget::Index),
            (true, false) => return None,
        };
        Some(ApplyArgs {
            reverse,
            target,
            zero_context,
        })
    }

    /// The same application with the direction flipped (apply vs. un-apply)
    pub fn reversed(self) -> Self {
        Self {
            reverse: !self.reverse,
            ..self
        }
    }

    /// Argument list for `git`, with `-` for the patch on stdin
    pub fn to_git_args(self) -> Vec<&'static str> {
        let mut args = vec!["apply"];
        if self.reverse {
            args.push("-R");
        }
        args.push(match self.target {
            ApplyTarget::Index => "--cached",
            ApplyTarget::IndexAndWorktree => "--index",
        });
        if self.zero_context {
            args.push("--unidiff-zero");
        }
        args.push("-");
        args
    }
}

/// One completed application, recorded for undo.
///
/// Pushed only after the apply succeeded; undoing replays the same patch
/// with [`ApplyArgs::reversed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEntry {
    pub args: ApplyArgs,
    pub patch: String,
    /// Cursor set at the time of the application, restored verbatim when
    /// the view is still in the same cached mode
    pub cursors: Vec<Region>,
    pub was_cached_mode: bool,
}
