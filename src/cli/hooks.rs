//! Hook handlers invoked by the assistant (and the git post-commit hook).
//!
//! Handlers return ordinary `Result`s. [`run_hook`] is the only place where a failure is
//! turned into a logged no-op, so a broken capture never breaks the user's commit.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::git::Git;
use crate::models::{ActiveSession, HookPayload};
use crate::parsers::parse_transcript_file;
use crate::session::SessionTracker;
use crate::storage::{NoteStore, build_record};
use crate::utils::short_sha;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Done,
    Skipped(&'static str),
}

/// Everything a hook handler touches, resolved once per invocation
#[derive(Debug, Clone)]
pub struct HookContext<G> {
    pub git: G,
    pub tracker: SessionTracker,
    /// Directory the hook runs for; project path when the payload carries no `cwd`
    pub cwd: PathBuf,
}

impl<G: Git> HookContext<G> {
    /// State lives under the repository root, or under `cwd` outside a repository.
    /// Without a `claude_dir` only the active-session slot is used for discovery.
    pub fn new(git: G, cwd: impl Into<PathBuf>, claude_dir: Option<PathBuf>) -> Self {
        let cwd = cwd.into();
        let root = git.repo_root().unwrap_or_else(|e| {
            debug!("not inside a repository ({}), keeping state in {}", e, cwd.display());
            cwd.clone()
        });
        let tracker = match claude_dir {
            Some(claude_dir) => SessionTracker::new(&root, claude_dir),
            None => SessionTracker::without_index(&root),
        };
        Self { git, tracker, cwd }
    }

    fn project_path(&self, payload: &HookPayload) -> PathBuf {
        payload.cwd.clone().unwrap_or_else(|| self.cwd.clone())
    }
}

/// Read a hook payload. Empty input yields an empty payload when `allow_empty` is set.
pub fn read_payload<R: Read>(mut reader: R, allow_empty: bool) -> Result<HookPayload> {
    let mut input = String::new();
    reader.read_to_string(&mut input).context("Failed to read hook input")?;
    if input.trim().is_empty() && allow_empty {
        return Ok(HookPayload::default());
    }
    serde_json::from_str(&input).context("Failed to parse hook JSON")
}

/// Run a hook body, logging instead of propagating any failure
pub fn run_hook<F>(name: &str, body: F)
where
    F: FnOnce() -> Result<HookOutcome>,
{
    match body() {
        Ok(HookOutcome::Done) => debug!(hook = name, "hook completed"),
        Ok(HookOutcome::Skipped(reason)) => debug!(hook = name, reason, "hook skipped"),
        Err(e) => warn!(hook = name, "hook failed: {:#}", e),
    }
}

/// Record the starting session as the active one
pub fn handle_session_start<G: Git>(
    ctx: &HookContext<G>,
    payload: &HookPayload,
) -> Result<HookOutcome> {
    let Some((session_id, transcript_path)) = payload.session_ref() else {
        warn!("session-start payload is missing session_id or transcript_path");
        return Ok(HookOutcome::Skipped("missing session_id or transcript_path"));
    };

    let session = ActiveSession {
        session_id: session_id.to_string(),
        transcript_path: transcript_path.clone(),
        started_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        project_path: ctx.project_path(payload),
    };
    ctx.tracker.write_active(&session)?;

    info!("session started: {}", short_sha(session_id));
    Ok(HookOutcome::Done)
}

pub fn handle_session_end<G: Git>(ctx: &HookContext<G>, payload: &HookPayload) -> Result<HookOutcome> {
    ctx.tracker.clear_active()?;
    info!(
        "session ended: {} ({})",
        payload.session_id.as_deref().map(short_sha).unwrap_or("unknown"),
        payload.reason.as_deref().unwrap_or("no reason given")
    );
    Ok(HookOutcome::Done)
}

/// Capture the conversation behind the current HEAD commit.
///
/// Only Bash tool uses running `git commit` qualify unless `force` is set. The session comes
/// from the payload when it names one, otherwise from discovery.
pub fn handle_store<G: Git>(
    ctx: &HookContext<G>,
    payload: &HookPayload,
    force: bool,
) -> Result<HookOutcome> {
    if !force && !payload.is_commit_action() {
        return Ok(HookOutcome::Skipped("not a git commit"));
    }

    let project_path = ctx.project_path(payload);
    let session = match payload.session_ref() {
        Some((session_id, transcript_path)) => {
            session_from_payload(&ctx.tracker, session_id, transcript_path, &project_path)
        }
        None => match ctx.tracker.discover(&project_path) {
            Some(session) => session,
            None => {
                info!("no active session for {}", project_path.display());
                return Ok(HookOutcome::Skipped("no active session"));
            }
        },
    };

    let transcript = parse_transcript_file(&session.transcript_path)?;
    let head = ctx.git.resolve_head().context("Failed to resolve HEAD")?;
    let branch = ctx.git.current_branch().ok();
    let record = build_record(&session, &transcript, &head, branch)?;
    NoteStore::new(&ctx.git).add(&head, &record)?;

    info!(
        "stored conversation for {} ({} entries, session {})",
        short_sha(&head),
        record.message_count,
        short_sha(&record.session_id)
    );
    Ok(HookOutcome::Done)
}

/// Session named by the payload; `started_at` comes from the slot when it tracks the same id
fn session_from_payload(
    tracker: &SessionTracker,
    session_id: &str,
    transcript_path: &Path,
    project_path: &Path,
) -> ActiveSession {
    let started_at = tracker
        .read_active()
        .ok()
        .flatten()
        .filter(|active| active.session_id == session_id)
        .map(|active| active.started_at)
        .unwrap_or_default();

    ActiveSession {
        session_id: session_id.to_string(),
        transcript_path: transcript_path.to_path_buf(),
        started_at,
        project_path: project_path.to_path_buf(),
    }
}
