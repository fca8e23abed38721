use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{ActiveSession, SessionIndexEntry};
use crate::parsers::deserializers::parse_timestamp_value;
use crate::session::index::load_project_entries;
use crate::utils::active_session_path;

/// A tracked session whose transcript has not changed for this long is treated as ended
pub const STALE_SESSION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Index entries modified longer ago than this are never picked by discovery
pub const RECENT_SESSION_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Where [`SessionTracker::discover`] looks for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverySource {
    /// The persisted active-session slot, if it matches the project and is not stale
    ActiveSlot,
    /// The most recently modified entry of the assistant's session index
    SessionIndex,
}

/// Discovery precedence: first source yielding a session wins
pub const DISCOVERY_ORDER: [DiscoverySource; 2] =
    [DiscoverySource::ActiveSlot, DiscoverySource::SessionIndex];

/// Tracks the session producing commits in one working copy.
///
/// Holds one slot file under the working copy root. Writes overwrite unconditionally and
/// there is no locking: concurrent hook invocations race and the last writer wins.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    slot_path: PathBuf,
    /// `None` when the assistant's directory could not be resolved; only the slot is consulted
    claude_dir: Option<PathBuf>,
}

impl SessionTracker {
    /// Tracker for the working copy rooted at `root`, reading the assistant's index from
    /// `claude_dir`
    pub fn new(root: &Path, claude_dir: impl Into<PathBuf>) -> Self {
        Self { slot_path: active_session_path(root), claude_dir: Some(claude_dir.into()) }
    }

    /// Tracker that never falls back to the assistant's session indexes
    pub fn without_index(root: &Path) -> Self {
        Self { slot_path: active_session_path(root), claude_dir: None }
    }

    pub fn slot_path(&self) -> &Path {
        &self.slot_path
    }

    /// Persist `session` as the active session, replacing any previous one
    pub fn write_active(&self, session: &ActiveSession) -> Result<()> {
        let dir = self.slot_path.parent().context("Active session path has no parent")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;

        let json =
            serde_json::to_string_pretty(session).context("Failed to serialize active session")?;

        // temp file + rename so readers never see a partial slot; the pid keeps
        // concurrent hook processes off each other's temp file
        let temp = self.slot_path.with_extension(format!("json.{}.tmp", std::process::id()));
        fs::write(&temp, json).context("Failed to write active session temp file")?;
        fs::rename(&temp, &self.slot_path).context("Failed to rename active session temp file")?;

        debug!(session_id = %session.session_id, path = %self.slot_path.display(), "wrote active session");
        Ok(())
    }

    /// Read the slot; `Ok(None)` when no session is recorded
    pub fn read_active(&self) -> Result<Option<ActiveSession>> {
        let content = match fs::read_to_string(&self.slot_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read active session: {}", self.slot_path.display())
                });
            }
        };
        let session = serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse active session: {}", self.slot_path.display())
        })?;
        Ok(Some(session))
    }

    /// Remove the slot. A missing slot is not an error.
    pub fn clear_active(&self) -> Result<()> {
        match fs::remove_file(&self.slot_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove active session: {}", self.slot_path.display())
            }),
        }
    }

    /// Locate the session most likely producing commits in `project_path`
    pub fn discover(&self, project_path: &Path) -> Option<ActiveSession> {
        self.discover_at(project_path, SystemTime::now())
    }

    /// [`discover`](Self::discover) against an explicit clock.
    ///
    /// Walks [`DISCOVERY_ORDER`]; a source that fails to read counts as "not found".
    pub fn discover_at(&self, project_path: &Path, now: SystemTime) -> Option<ActiveSession> {
        for source in DISCOVERY_ORDER {
            match self.discover_from(source, project_path, now) {
                Ok(Some(session)) => {
                    debug!(?source, session_id = %session.session_id, "discovered session");
                    return Some(session);
                }
                Ok(None) => {}
                Err(e) => debug!(?source, "session discovery source failed: {:#}", e),
            }
        }
        None
    }

    /// Query a single discovery source
    pub fn discover_from(
        &self,
        source: DiscoverySource,
        project_path: &Path,
        now: SystemTime,
    ) -> Result<Option<ActiveSession>> {
        match source {
            DiscoverySource::ActiveSlot => Ok(self
                .read_active()?
                .filter(|s| s.project_path == project_path && is_active_at(s, now))),
            DiscoverySource::SessionIndex => {
                let claude_dir =
                    self.claude_dir.as_deref().context("Claude directory is not known")?;
                let entries = load_project_entries(claude_dir, project_path)?;
                Ok(select_recent_entry(&entries, project_path, DateTime::<Utc>::from(now)))
            }
        }
    }
}

/// True if the session's transcript exists and changed within [`STALE_SESSION_TIMEOUT`]
pub fn is_active(session: &ActiveSession) -> bool {
    is_active_at(session, SystemTime::now())
}

pub fn is_active_at(session: &ActiveSession, now: SystemTime) -> bool {
    if session.transcript_path.as_os_str().is_empty() {
        return false;
    }
    let Ok(modified) = fs::metadata(&session.transcript_path).and_then(|m| m.modified()) else {
        return false;
    };
    // an mtime ahead of `now` counts as just written
    let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
    age < STALE_SESSION_TIMEOUT
}

/// Pick the most recently modified index entry for `project_path` within
/// [`RECENT_SESSION_WINDOW`] of `now`. Ties keep the earliest entry in index order.
pub fn select_recent_entry(
    entries: &[SessionIndexEntry],
    project_path: &Path,
    now: DateTime<Utc>,
) -> Option<ActiveSession> {
    let window = chrono::Duration::from_std(RECENT_SESSION_WINDOW).ok()?;
    let mut best: Option<(&SessionIndexEntry, DateTime<Utc>)> = None;

    for entry in entries {
        if entry.session_id.is_empty() || entry.project_path.as_deref() != Some(project_path) {
            continue;
        }
        let Some(modified) = entry.modified.as_ref().and_then(parse_timestamp_value) else {
            continue;
        };
        if now.signed_duration_since(modified) > window {
            continue;
        }
        if best.is_none_or(|(_, best_modified)| modified > best_modified) {
            best = Some((entry, modified));
        }
    }

    best.map(|(entry, _)| ActiveSession {
        session_id: entry.session_id.clone(),
        transcript_path: entry.full_path.clone().unwrap_or_default(),
        started_at: entry.created_text(),
        project_path: project_path.to_path_buf(),
    })
}
