//! Data models for conversation capture.
//!
//! - [`Transcript`] / [`TranscriptEntry`] - lines of an assistant session log
//! - [`ActiveSession`] - the single tracked session of a working copy
//! - [`SessionIndex`] / [`SessionIndexEntry`] - the assistant's own session index (read-only)
//! - [`HookPayload`] - JSON the assistant passes to hook commands on stdin
//! - [`ConversationRecord`] - the note body stored per commit

pub mod record;
pub mod session;
pub mod transcript;

pub use record::{ConversationRecord, RECORD_VERSION};
pub use session::{ActiveSession, HookPayload, SessionIndex, SessionIndexEntry, ToolInput};
pub use transcript::{ContentBlock, EntryFields, Message, MessageType, Transcript, TranscriptEntry};
