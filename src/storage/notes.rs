use std::collections::BTreeSet;

use anyhow::{Context, Result};
use tracing::debug;

use super::NOTES_REF;
use crate::git::Git;
use crate::models::ConversationRecord;

/// Conversation records keyed by commit SHA, stored as git notes under [`NOTES_REF`]
#[derive(Debug, Clone)]
pub struct NoteStore<G> {
    git: G,
}

impl<G: Git> NoteStore<G> {
    pub fn new(git: G) -> Self {
        Self { git }
    }

    pub fn git(&self) -> &G {
        &self.git
    }

    /// Store `record` on `commit_sha`, replacing any record already there
    pub fn add(&self, commit_sha: &str, record: &ConversationRecord) -> Result<()> {
        let note = record.to_note()?;
        self.git
            .add_note(NOTES_REF, commit_sha, &note)
            .with_context(|| format!("Failed to store conversation on {}", commit_sha))?;
        debug!(commit = commit_sha, session_id = %record.session_id, "stored conversation note");
        Ok(())
    }

    /// Record attached to `commit_sha`, `Ok(None)` if the commit has none
    pub fn get(&self, commit_sha: &str) -> Result<Option<ConversationRecord>> {
        let note = self
            .git
            .show_note(NOTES_REF, commit_sha)
            .with_context(|| format!("Failed to read conversation note on {}", commit_sha))?;
        note.map(|body| ConversationRecord::from_note(commit_sha, &body)).transpose()
    }

    /// Whether `commit_sha` holds a record; lookup failures count as `false`
    pub fn has(&self, commit_sha: &str) -> bool {
        matches!(self.git.show_note(NOTES_REF, commit_sha), Ok(Some(_)))
    }

    /// Every commit currently holding a record. An empty store is not an error.
    pub fn list_keys(&self) -> Result<BTreeSet<String>> {
        let commits =
            self.git.list_noted_commits(NOTES_REF).context("Failed to list conversation notes")?;
        Ok(commits.into_iter().collect())
    }
}
