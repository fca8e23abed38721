//! Propagation of the conversation notes ref to and from remotes.
//!
//! Transport failures (rejected updates, connectivity, authentication) are returned as-is;
//! there is no retry and no merge of diverged notes. The unit of retry is rerunning the
//! command.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::git::Git;
use crate::storage::{NOTES_REF, NoteStore};

/// How `pull` treats a local notes ref that differs from the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullMode {
    /// Refuse updates that would discard local notes
    #[default]
    FastForward,
    /// Overwrite the local ref with the remote tip; unpushed local records are lost
    Force,
}

/// Result of a sync run, for user-facing reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub remote: String,
    pub conversations: usize,
}

#[derive(Debug, Clone)]
pub struct SyncEngine<G> {
    store: NoteStore<G>,
}

impl<G: Git> SyncEngine<G> {
    pub fn new(git: G) -> Self {
        Self { store: NoteStore::new(git) }
    }

    pub fn store(&self) -> &NoteStore<G> {
        &self.store
    }

    /// Push the whole notes ref to `remote`, bypassing local pre-push hooks
    pub fn push(&self, remote: &str) -> Result<SyncSummary> {
        self.store.git().push_ref(remote, NOTES_REF).with_context(|| {
            format!("Failed to push {} to {}", NOTES_REF, remote)
        })?;

        let conversations = self.store.list_keys()?.len();
        info!(remote, conversations, "pushed conversation notes");
        Ok(SyncSummary { remote: remote.to_string(), conversations })
    }

    /// Fetch the notes ref from `remote` into the local ref
    pub fn pull(&self, remote: &str, mode: PullMode) -> Result<SyncSummary> {
        let force = mode == PullMode::Force;
        if force {
            warn!(remote, "force-fetching {}; local unpushed conversations will be lost", NOTES_REF);
        }

        self.store.git().fetch_ref(remote, NOTES_REF, force).with_context(|| {
            format!("Failed to fetch {} from {}", NOTES_REF, remote)
        })?;

        let conversations = self.store.list_keys()?.len();
        info!(remote, conversations, "fetched conversation notes");
        Ok(SyncSummary { remote: remote.to_string(), conversations })
    }
}
