//! Diff-view engine for interactive git hunk staging inside a text editor.
//!
//! The host editor renders a unified diff as plain text and forwards user
//! gestures (cursor positions, key presses) to this crate, which turns them
//! into git operations:
//!
//! - [`index::ParsedDiff`] splits the rendered buffer into addressable
//!   file-header and hunk spans and answers offset queries against them.
//! - [`jump`] maps a cursor inside a hunk to the (row, column) it refers to
//!   in the post-image file.
//! - [`patch::patch_for_cursors`] assembles the minimal patch covering the
//!   hunks under a set of cursors.
//! - [`apply::ApplyArgs`] picks the `git apply` argument combination for
//!   the stage/discard intent and records undo state.
//! - [`relocate`] finds "the same" hunk again after the buffer has been
//!   regenerated, by exact and then symmetrically shrinking content search.
//! - [`view::DiffView`] ties it all together as one per-view session.
//!
//! The host's buffer and the repository are reached only through the
//! [`buffer::Buffer`] and [`git::Repo`] collaborator traits.

pub mod apply;
pub mod buffer;
pub mod git;
pub mod hunk;
pub mod index;
pub mod jump;
pub mod patch;
pub mod relocate;
pub mod view;

pub use apply::{ApplyArgs, ApplyTarget, UndoEntry};
pub use buffer::{Buffer, Region, StringBuffer};
pub use git::{DiffSpec, GitRepo, Repo, RepoError};
pub use index::ParsedDiff;
pub use jump::JumpTarget;
pub use view::{DiffToggle, DiffView, ViewOpError, ViewSettings};
