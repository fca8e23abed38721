use serde::{Deserialize, Serialize};

/// Note format version written by this crate
pub const RECORD_VERSION: u32 = 1;

/// One stored conversation, attached as a note to the commit it produced.
///
/// `transcript` holds the serialized transcript, gzip-compressed and base64-encoded.
/// `checksum` covers the uncompressed bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    pub session_id: String,
    /// Filled from the note key on read; never serialized
    #[serde(skip)]
    pub commit_sha: String,
    #[serde(default)]
    pub captured_at: String,
    #[serde(default)]
    pub started_at: String,
    #[serde(default)]
    pub project_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub message_count: usize,
    pub checksum: String,
    pub transcript: String,
}

fn default_version() -> u32 {
    RECORD_VERSION
}
