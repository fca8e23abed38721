use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The session currently believed to be producing commits in a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub session_id: String,
    pub transcript_path: PathBuf,
    pub started_at: String,
    pub project_path: PathBuf,
}

/// `sessions-index.json` as maintained by the assistant (read-only here)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionIndex {
    #[serde(default)]
    pub entries: Vec<SessionIndexEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIndexEntry {
    /// Empty when the entry has no `sessionId`; such entries are never selected
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub project_path: Option<PathBuf>,
    #[serde(default)]
    pub full_path: Option<PathBuf>,
    #[serde(default)]
    pub created: Option<Value>,
    #[serde(default)]
    pub modified: Option<Value>,
}

impl SessionIndexEntry {
    pub fn created_text(&self) -> String {
        match &self.created {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

/// Hook payload delivered on stdin by the assistant.
///
/// Shared by the session lifecycle and PostToolUse hooks; every field is optional so that
/// validation happens in the handler rather than in the decoder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookPayload {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<ToolInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub command: Option<String>,
}

impl HookPayload {
    /// Session id and transcript path, when both are present and non-empty
    pub fn session_ref(&self) -> Option<(&str, &PathBuf)> {
        let id = self.session_id.as_deref().filter(|s| !s.is_empty())?;
        let path = self.transcript_path.as_ref().filter(|p| !p.as_os_str().is_empty())?;
        Some((id, path))
    }

    /// True for a Bash tool use whose command runs `git commit`
    pub fn is_commit_action(&self) -> bool {
        self.tool_name.as_deref() == Some("Bash")
            && self
                .tool_input
                .as_ref()
                .and_then(|input| input.command.as_deref())
                .is_some_and(|command| command.contains("git commit"))
    }
}
