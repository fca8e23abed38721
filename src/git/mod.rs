//! Version-control capability seam.
//!
//! Everything that touches the repository goes through the [`Git`] trait. [`GitCli`] runs the
//! `git` binary as a subprocess and owns all exit-code interpretation; [`MemoryGit`] keeps
//! commits, notes and remotes in memory for tests.

pub mod command;
pub mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use command::GitCli;
pub use memory::{MemoryGit, MemoryRemote};

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited non-zero; `stderr` is passed through verbatim
    #[error("git {args} failed: {stderr}")]
    Failed { args: String, code: Option<i32>, stderr: String },

    #[error("{0}")]
    Rejected(String),
}

impl GitError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GitError::Failed { code, .. } => *code,
            _ => None,
        }
    }
}

pub type GitResult<T> = Result<T, GitError>;

/// Repository operations needed for conversation capture and sync
pub trait Git {
    /// Top-level directory of the working copy
    fn repo_root(&self) -> GitResult<PathBuf>;

    /// Resolve a revision (`HEAD`, a branch, a full or abbreviated SHA) to a full commit SHA
    fn resolve_commit(&self, rev: &str) -> GitResult<String>;

    fn resolve_head(&self) -> GitResult<String> {
        self.resolve_commit("HEAD")
    }

    /// Short name of the checked-out branch (`HEAD` when detached)
    fn current_branch(&self) -> GitResult<String>;

    /// Attach `content` to `commit` under `notes_ref`, replacing any existing note
    fn add_note(&self, notes_ref: &str, commit: &str, content: &str) -> GitResult<()>;

    /// Note body for `commit`, or `None` when the commit has no note
    fn show_note(&self, notes_ref: &str, commit: &str) -> GitResult<Option<String>>;

    /// Commits holding a note under `notes_ref`; empty when the ref does not exist yet
    fn list_noted_commits(&self, notes_ref: &str) -> GitResult<Vec<String>>;

    /// Push `refname` to `remote` without running local pre-push hooks
    fn push_ref(&self, remote: &str, refname: &str) -> GitResult<()>;

    /// Fetch `refname` from `remote` into the same local ref.
    /// Without `force` the update must be a fast-forward.
    fn fetch_ref(&self, remote: &str, refname: &str, force: bool) -> GitResult<()>;
}

impl<G: Git + ?Sized> Git for &G {
    fn repo_root(&self) -> GitResult<PathBuf> {
        (**self).repo_root()
    }

    fn resolve_commit(&self, rev: &str) -> GitResult<String> {
        (**self).resolve_commit(rev)
    }

    fn current_branch(&self) -> GitResult<String> {
        (**self).current_branch()
    }

    fn add_note(&self, notes_ref: &str, commit: &str, content: &str) -> GitResult<()> {
        (**self).add_note(notes_ref, commit, content)
    }

    fn show_note(&self, notes_ref: &str, commit: &str) -> GitResult<Option<String>> {
        (**self).show_note(notes_ref, commit)
    }

    fn list_noted_commits(&self, notes_ref: &str) -> GitResult<Vec<String>> {
        (**self).list_noted_commits(notes_ref)
    }

    fn push_ref(&self, remote: &str, refname: &str) -> GitResult<()> {
        (**self).push_ref(remote, refname)
    }

    fn fetch_ref(&self, remote: &str, refname: &str, force: bool) -> GitResult<()> {
        (**self).fetch_ref(remote, refname, force)
    }
}
