//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{Value, json};
use tempfile::TempDir;

/// Run git in `dir`, panicking with stderr on failure; returns trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A throwaway repository with an identity and no hooks
pub struct TempRepo {
    temp_dir: TempDir,
}

impl TempRepo {
    /// Create a repository on `main` with one initial commit
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = Self { temp_dir };
        repo.git(&["init", "-q", "-b", "main"]);
        repo.configure();
        repo.commit("initial commit");
        repo
    }

    /// Clone `remote` into a fresh directory
    pub fn clone_from(remote: &Path) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().to_string_lossy().to_string();
        let source = remote.to_string_lossy().to_string();
        git(temp_dir.path(), &["clone", "-q", &source, &target]);
        let repo = Self { temp_dir };
        repo.configure();
        repo
    }

    fn configure(&self) {
        self.git(&["config", "user.name", "Test User"]);
        self.git(&["config", "user.email", "test@example.com"]);
        self.git(&["config", "commit.gpgsign", "false"]);
        self.git(&["config", "core.hooksPath", "/dev/null"]);
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn git(&self, args: &[&str]) -> String {
        git(self.path(), args)
    }

    /// Create an empty commit and return its SHA
    pub fn commit(&self, message: &str) -> String {
        self.git(&["commit", "-q", "--allow-empty", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    /// Attach a bare repository as `name` and push `main` to it
    pub fn add_bare_remote(&self, name: &str) -> TempDir {
        let remote = TempDir::new().expect("Failed to create temp dir");
        git(remote.path(), &["init", "-q", "--bare"]);
        let url = remote.path().to_string_lossy().to_string();
        self.git(&["remote", "add", name, &url]);
        self.git(&["push", "-q", name, "main"]);
        remote
    }

    /// The active-session slot inside this repository
    pub fn slot_path(&self) -> PathBuf {
        self.path().join(".ai-commit-notes").join("active-session.json")
    }
}

impl Default for TempRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for JSONL transcripts
pub struct TranscriptBuilder {
    lines: Vec<String>,
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add a user message with plain string content
    pub fn user(mut self, uuid: &str, text: &str) -> Self {
        let line = json!({
            "uuid": uuid,
            "type": "user",
            "timestamp": "2025-01-15T10:30:00Z",
            "message": {"role": "user", "content": text},
        });
        self.lines.push(line.to_string());
        self
    }

    /// Add an assistant message whose only block is a Bash tool use
    pub fn assistant_bash(mut self, uuid: &str, parent: &str, command: &str) -> Self {
        let line = json!({
            "uuid": uuid,
            "parentUuid": parent,
            "type": "assistant",
            "timestamp": "2025-01-15T10:30:05Z",
            "message": {
                "role": "assistant",
                "content": [{"type": "tool_use", "id": "toolu_1", "name": "Bash", "input": {"command": command}}],
            },
        });
        self.lines.push(line.to_string());
        self
    }

    /// Add a line verbatim (it does not have to be JSON)
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn to_jsonl(&self) -> String {
        self.lines.join("\n")
    }

    /// Write the transcript to `dir/name` and return its path
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.to_jsonl()).expect("Failed to write transcript");
        path
    }
}

impl Default for TranscriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A transcript as a Claude session would leave it: a prompt and the commit it triggered
pub fn commit_transcript() -> TranscriptBuilder {
    TranscriptBuilder::new()
        .user("u-1", "Please commit the change")
        .assistant_bash("a-1", "u-1", "git commit -m 'Add feature'")
}

/// Builder for test `.claude` directories holding session indexes
pub struct ClaudeDirBuilder {
    temp_dir: TempDir,
}

impl ClaudeDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add `projects/<dir_name>/sessions-index.json` with the given entries
    pub fn with_session_index(self, dir_name: &str, entries: &[Value]) -> Self {
        let project_dir = self.temp_dir.path().join("projects").join(dir_name);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");
        let index = json!({"version": 1, "entries": entries});
        fs::write(project_dir.join("sessions-index.json"), index.to_string())
            .expect("Failed to write sessions-index.json");
        self
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ClaudeDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One `sessions-index.json` entry
pub fn index_entry(session_id: &str, project: &Path, transcript: &Path, modified: &str) -> Value {
    json!({
        "sessionId": session_id,
        "projectPath": project,
        "fullPath": transcript,
        "created": "2025-01-15T10:00:00Z",
        "modified": modified,
    })
}
