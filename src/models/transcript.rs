use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a transcript line as written by the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Assistant,
    System,
    /// Bookkeeping lines such as `summary` or `file-history-snapshot`
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub input: Option<Value>,
    #[serde(default)]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            block_type: "text".to_string(),
            text: Some(text.into()),
            thinking: None,
            id: None,
            name: None,
            input: None,
            tool_use_id: None,
            content: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_content_blocks")]
    pub content: Vec<ContentBlock>,
}

/// Structured view of one transcript line.
///
/// Deserialized opportunistically; every field is optional so that unusual lines still
/// decode where possible.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntryFields {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(rename = "parentUuid", default)]
    pub parent_uuid: Option<String>,
    #[serde(rename = "type", default)]
    pub entry_type: Option<MessageType>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<Message>,
}

/// One line of a transcript.
///
/// `raw` always holds the exact bytes of the source line (without its newline), whether or
/// not the structured fields could be decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub uuid: Option<String>,
    pub parent_uuid: Option<String>,
    pub entry_type: Option<MessageType>,
    pub timestamp: Option<DateTime<Utc>>,
    pub message: Option<Message>,
    pub raw: Vec<u8>,
}

impl TranscriptEntry {
    pub fn from_raw(raw: Vec<u8>) -> Self {
        let fields = serde_json::from_slice::<EntryFields>(&raw).unwrap_or_default();
        Self {
            uuid: fields.uuid,
            parent_uuid: fields.parent_uuid,
            entry_type: fields.entry_type,
            timestamp: fields.timestamp,
            message: fields.message,
            raw,
        }
    }

    /// True when the line decoded into the structured shape
    pub fn is_structured(&self) -> bool {
        self.entry_type.is_some() || self.uuid.is_some() || self.message.is_some()
    }
}

/// Ordered transcript entries in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub entries: Vec<TranscriptEntry>,
}
