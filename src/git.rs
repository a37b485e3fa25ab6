//! Repository collaborators.
//!
//! The engine never touches a repository directly; it computes diffs and
//! applies patches through [`Repo`]. [`GitRepo`] is the production
//! implementation shelling out to the `git` executable.

use error_set::error_set;
use std::process::{Command, Stdio};

use crate::apply::ApplyArgs;

error_set! {
    /// Errors from git command execution
    RepoError := {
        #[display("Failed to run git diff: {message}")]
        DiffSpawnFailed { message: String },
        #[display("git diff failed: {stderr}")]
        DiffExitError { stderr: String },
        /// Undecodable diff output; callers disable diffing for the view
        /// instead of retrying
        #[display("Invalid UTF-8 in git diff output: {message}")]
        InvalidUtf8 { message: String },
        #[display("Failed to spawn git apply: {message}")]
        ApplySpawnFailed { message: String },
        #[display("Failed to get stdin handle for git apply")]
        ApplyStdinFailed,
        #[display("Failed to write patch to git apply: {message}")]
        ApplyWriteFailed { message: String },
        #[display("Failed to wait for git apply: {message}")]
        ApplyWaitFailed { message: String },
        #[display("git apply failed: {stderr}")]
        ApplyExitError { stderr: String },
    }
}

/// Everything that parameterizes one diff computation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSpec<'a> {
    pub cached: bool,
    pub ignore_whitespace: bool,
    pub word_diff: bool,
    pub context_lines: u32,
    pub base_commit: Option<&'a str>,
    pub target_commit: Option<&'a str>,
    pub file_path: Option<&'a str>,
}

/// External version-control collaborator
pub trait Repo {
    /// Produce unified-diff text for the given parameters
    fn compute_diff(&self, spec: &DiffSpec<'_>) -> Result<String, RepoError>;

    /// Apply `patch` with the resolved argument combination
    fn apply_patch(&self, args: ApplyArgs, patch: &str) -> Result<(), RepoError>;
}

/// [`Repo`] backed by the `git` executable
pub struct GitRepo<'a> {
    repo_path: &'a str,
}

impl<'a> GitRepo<'a> {
    pub fn new(repo_path: &'a str) -> Self {
        Self { repo_path }
    }
}

impl Repo for GitRepo<'_> {
    fn compute_diff(&self, spec: &DiffSpec<'_>) -> Result<String, RepoError> {
        let mut args = vec![
            "-C".to_string(),
            self.repo_path.to_string(),
            "diff".to_string(),
            "--no-ext-diff".to_string(),
            "--no-color".to_string(),
            "--patch".to_string(),
            format!("--unified={}", spec.context_lines),
        ];
        if spec.ignore_whitespace {
            args.push("--ignore-all-space".to_string());
        }
        if spec.word_diff {
            args.push("--word-diff".to_string());
        }
        if spec.cached {
            args.push("--cached".to_string());
        }
        if let Some(base) = spec.base_commit {
            args.push(base.to_string());
        }
        if let Some(target) = spec.target_commit {
            args.push(target.to_string());
        }
        args.push("--".to_string());
        if let Some(file) = spec.file_path {
            args.push(file.to_string());
        }

        let output =
            Command::new("git")
                .args(&args)
                .output()
                .map_err(|e| RepoError::DiffSpawnFailed {
                    message: e.to_string(),
                })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RepoError::DiffExitError {
                stderr: stderr.into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| RepoError::InvalidUtf8 {
            message: e.to_string(),
        })
    }

    fn apply_patch(&self, apply: ApplyArgs, patch: &str) -> Result<(), RepoError> {
        use std::io::Write;

        let mut args = vec!["-C", self.repo_path];
        args.extend(apply.to_git_args());

        let mut child = Command::new("git")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RepoError::ApplySpawnFailed {
                message: e.to_string(),
            })?;

        child
            .stdin
            .take()
            .ok_or(RepoError::ApplyStdinFailed)?
            .write_all(patch.as_bytes())
            .map_err(|e| RepoError::ApplyWriteFailed {
                message: e.to_string(),
            })?;

        let output = child
            .wait_with_output()
            .map_err(|e| RepoError::ApplyWaitFailed {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RepoError::ApplyExitError {
                stderr: stderr.into_owned(),
            });
        }

        Ok(())
    }
}
