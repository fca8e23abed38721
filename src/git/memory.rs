use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Git, GitError, GitResult};

/// Contents of one notes ref. `history` lists the update ids that produced it, so a
/// fast-forward is "the other history starts with ours".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct NotesRefState {
    history: Vec<u64>,
    notes: BTreeMap<String, String>,
}

impl NotesRefState {
    fn is_ancestor_of(&self, other: &NotesRefState) -> bool {
        other.history.starts_with(&self.history)
    }
}

type RefTable = BTreeMap<String, NotesRefState>;

static NEXT_UPDATE_ID: AtomicU64 = AtomicU64::new(1);

/// A bare remote shared between [`MemoryGit`] clones
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    refs: Arc<Mutex<RefTable>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits holding a note under `notes_ref` on the remote
    pub fn noted_commits(&self, notes_ref: &str) -> Vec<String> {
        lock(&self.refs).get(notes_ref).map(|r| r.notes.keys().cloned().collect()).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct RepoState {
    commits: Vec<String>,
    branch: String,
    refs: RefTable,
    remotes: HashMap<String, MemoryRemote>,
}

/// In-memory [`Git`] used by tests: a linear list of commits plus notes refs and remotes
#[derive(Debug, Clone)]
pub struct MemoryGit {
    root: PathBuf,
    state: Arc<Mutex<RepoState>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryGit {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let state = RepoState { branch: "main".to_string(), ..RepoState::default() };
        Self { root: root.into(), state: Arc::new(Mutex::new(state)) }
    }

    /// Append a commit and move HEAD to it
    pub fn commit(&self, sha: &str) -> &Self {
        lock(&self.state).commits.push(sha.to_string());
        self
    }

    pub fn add_remote(&self, name: &str, remote: &MemoryRemote) -> &Self {
        lock(&self.state).remotes.insert(name.to_string(), remote.clone());
        self
    }

    /// A fresh clone: same commits and remotes, no local notes
    pub fn clone_repo(&self, root: impl Into<PathBuf>) -> Self {
        let state = lock(&self.state);
        let cloned = RepoState {
            commits: state.commits.clone(),
            branch: state.branch.clone(),
            refs: RefTable::new(),
            remotes: state.remotes.clone(),
        };
        Self { root: root.into(), state: Arc::new(Mutex::new(cloned)) }
    }

    fn remote(&self, name: &str) -> GitResult<MemoryRemote> {
        lock(&self.state).remotes.get(name).cloned().ok_or_else(|| {
            GitError::Rejected(format!("'{}' does not appear to be a git repository", name))
        })
    }

    fn find_commit(state: &RepoState, rev: &str) -> GitResult<String> {
        let found = if rev == "HEAD" {
            state.commits.last()
        } else {
            let mut matches = state.commits.iter().filter(|c| c.starts_with(rev));
            match (matches.next(), matches.next()) {
                (Some(c), None) if !rev.is_empty() => Some(c),
                _ => None,
            }
        };
        found.cloned().ok_or_else(|| GitError::Rejected(format!("unknown revision '{}'", rev)))
    }
}

impl Git for MemoryGit {
    fn repo_root(&self) -> GitResult<PathBuf> {
        Ok(self.root.clone())
    }

    fn resolve_commit(&self, rev: &str) -> GitResult<String> {
        Self::find_commit(&lock(&self.state), rev)
    }

    fn current_branch(&self) -> GitResult<String> {
        Ok(lock(&self.state).branch.clone())
    }

    fn add_note(&self, notes_ref: &str, commit: &str, content: &str) -> GitResult<()> {
        let mut state = lock(&self.state);
        let sha = Self::find_commit(&state, commit)?;
        let id = NEXT_UPDATE_ID.fetch_add(1, Ordering::Relaxed);
        let entry = state.refs.entry(notes_ref.to_string()).or_default();
        entry.history.push(id);
        entry.notes.insert(sha, format!("{}\n", content));
        Ok(())
    }

    fn show_note(&self, notes_ref: &str, commit: &str) -> GitResult<Option<String>> {
        let state = lock(&self.state);
        let sha = Self::find_commit(&state, commit)?;
        Ok(state.refs.get(notes_ref).and_then(|r| r.notes.get(&sha)).cloned())
    }

    fn list_noted_commits(&self, notes_ref: &str) -> GitResult<Vec<String>> {
        let state = lock(&self.state);
        Ok(state.refs.get(notes_ref).map(|r| r.notes.keys().cloned().collect()).unwrap_or_default())
    }

    fn push_ref(&self, remote: &str, refname: &str) -> GitResult<()> {
        let target = self.remote(remote)?;
        let state = lock(&self.state);
        let local = state.refs.get(refname).ok_or_else(|| {
            GitError::Rejected(format!("src refspec {} does not match any", refname))
        })?;

        let mut remote_refs = lock(&target.refs);
        if let Some(existing) = remote_refs.get(refname) {
            if !existing.is_ancestor_of(local) {
                return Err(GitError::Rejected(format!(
                    "! [rejected] {0} -> {0} (fetch first)",
                    refname
                )));
            }
        }
        remote_refs.insert(refname.to_string(), local.clone());
        Ok(())
    }

    fn fetch_ref(&self, remote: &str, refname: &str, force: bool) -> GitResult<()> {
        let source = self.remote(remote)?;
        let incoming = lock(&source.refs).get(refname).cloned().ok_or_else(|| {
            GitError::Rejected(format!("couldn't find remote ref {}", refname))
        })?;

        let mut state = lock(&self.state);
        if let Some(existing) = state.refs.get(refname) {
            if !force && !existing.is_ancestor_of(&incoming) {
                return Err(GitError::Rejected(format!(
                    "! [rejected] {0} -> {0} (non-fast-forward)",
                    refname
                )));
            }
        }
        state.refs.insert(refname.to_string(), incoming);
        Ok(())
    }
}
