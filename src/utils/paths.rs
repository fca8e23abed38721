use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::environment::STATE_DIR_NAME;

const ACTIVE_SESSION_FILENAME: &str = "active-session.json";

/// Encodes a project path into the assistant's per-project directory name.
///
/// Every character outside `[A-Za-z0-9]` becomes `-`, so the encoding is lossy; callers
/// that need the real path read it from the index entries instead of decoding.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ai_commit_notes::utils::encode_project_dir;
///
/// assert_eq!(encode_project_dir(Path::new("/Users/foo/my.app")), "-Users-foo-my-app");
/// ```
pub fn encode_project_dir(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Location of the active-session slot for a working copy rooted at `root`
pub fn active_session_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR_NAME).join(ACTIVE_SESSION_FILENAME)
}

/// Rejects symlinks so that index scanning never leaves the assistant's directory
pub fn validate_path_not_symlink(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    if metadata.file_type().is_symlink() {
        bail!("Path is a symlink: {}", path.display());
    }
    Ok(())
}

/// Formats a commit SHA for display
pub fn short_sha(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}
