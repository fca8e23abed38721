use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

/// Overrides the assistant's config directory (same variable the assistant honours)
pub const CLAUDE_CONFIG_DIR_VAR: &str = "CLAUDE_CONFIG_DIR";

/// Directory under the repository root holding local capture state
pub const STATE_DIR_NAME: &str = ".ai-commit-notes";

pub const DEFAULT_REMOTE: &str = "origin";

/// Get the Claude directory path: `$CLAUDE_CONFIG_DIR`, else `~/.claude`
pub fn get_claude_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(CLAUDE_CONFIG_DIR_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("HOME environment variable not set")?;
    Ok(home.join(".claude"))
}

/// Environment-derived settings shared by every command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `None` when neither `$CLAUDE_CONFIG_DIR` nor a home directory is available
    pub claude_dir: Option<PathBuf>,
    pub default_remote: String,
}

impl Settings {
    /// Never fails: an unresolvable Claude directory only disables index discovery
    pub fn from_env() -> Self {
        Self::with_claude_dir(get_claude_dir())
    }

    fn with_claude_dir(claude_dir: Result<PathBuf>) -> Self {
        let claude_dir = claude_dir
            .inspect_err(|e| warn!("Claude directory unavailable, session indexes disabled: {:#}", e))
            .ok();
        Self { claude_dir, default_remote: DEFAULT_REMOTE.to_string() }
    }
}
