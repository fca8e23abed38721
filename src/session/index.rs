//! Read-only access to the assistant's `sessions-index.json` files.
//!
//! The assistant keeps one index per project directory under `<claude_dir>/projects/`.
//! The directory name is a lossy encoding of the project path, so the encoded location is
//! tried first and every project directory is scanned when it is missing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::{SessionIndex, SessionIndexEntry};
use crate::utils::{encode_project_dir, validate_path_not_symlink};

const SESSIONS_INDEX_FILENAME: &str = "sessions-index.json";

/// Maximum number of session indexes read by one scan (security: prevent resource exhaustion)
const MAX_PROJECTS: usize = 1000;

/// Read the session index file at `path`
pub fn read_session_index(path: &Path) -> Result<SessionIndex> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session index: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session index: {}", path.display()))
}

/// Collect index entries that may belong to `project_path`.
///
/// Entries are returned unfiltered; matching on `projectPath` is the caller's job.
/// Returns an empty Vec when the assistant has no projects directory.
///
/// # Errors
///
/// Returns an error if the encoded index exists but cannot be read or parsed, or if the
/// projects directory cannot be listed. The fallback scan reads at most [`MAX_PROJECTS`]
/// indexes.
pub fn load_project_entries(claude_dir: &Path, project_path: &Path) -> Result<Vec<SessionIndexEntry>> {
    let projects_dir = claude_dir.join("projects");
    let direct = projects_dir.join(encode_project_dir(project_path)).join(SESSIONS_INDEX_FILENAME);

    if direct.is_file() {
        debug!(path = %direct.display(), "reading session index");
        return Ok(read_session_index(&direct)?.entries);
    }

    let mut entries = Vec::new();
    for index_path in discover_index_files(&projects_dir)? {
        match read_session_index(&index_path) {
            Ok(index) => entries.extend(index.entries),
            Err(e) => warn!("Skipping session index {}: {:#}", index_path.display(), e),
        }
    }
    Ok(entries)
}

/// Find every `projects/*/sessions-index.json`, skipping symlinked project directories
fn discover_index_files(projects_dir: &Path) -> Result<Vec<PathBuf>> {
    scan_index_files(projects_dir, MAX_PROJECTS)
}

/// Collect at most `limit` index files; the rest of the directory is left unscanned
fn scan_index_files(projects_dir: &Path, limit: usize) -> Result<Vec<PathBuf>> {
    if !projects_dir.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();

    let dir_entries = fs::read_dir(projects_dir)
        .with_context(|| format!("Failed to read projects directory: {}", projects_dir.display()))?;

    for entry in dir_entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if !path.is_dir() {
            continue;
        }

        if let Err(e) = validate_path_not_symlink(&path) {
            warn!("Skipping project directory: {:#}", e);
            continue;
        }

        let index_path = path.join(SESSIONS_INDEX_FILENAME);
        if !index_path.is_file() {
            continue;
        }

        if found.len() == limit {
            warn!(
                "Resource limit reached: scanning only {} session indexes in {}",
                limit,
                projects_dir.display()
            );
            break;
        }
        found.push(index_path);
    }

    found.sort();
    Ok(found)
}
