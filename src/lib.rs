//! AI Commit Notes - Attach AI assistant conversations to the git commits they produce
//!
//! Transcripts of Claude Code sessions are captured when a commit is made and stored as
//! git notes keyed by the commit SHA. It supports:
//!
//! - Tracking the active session through session start/end hooks
//! - Discovering a session from Claude's `sessions-index.json` when no hook fired
//! - Lossless parsing of JSONL transcripts, including lines that are not valid JSON
//! - Checksummed, compressed conversation records under `refs/notes/claude-conversations`
//! - Pushing and fetching the notes ref so conversations follow the repository
//!
//! # Example
//!
//! ```no_run
//! use ai_commit_notes::{GitCli, NoteStore};
//!
//! let git = GitCli::new();
//! let store = NoteStore::new(&git);
//! for commit in store.list_keys()? {
//!     if let Some(record) = store.get(&commit)? {
//!         println!("{} {} entries", commit, record.message_count);
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod git;
pub mod models;
pub mod parsers;
pub mod session;
pub mod storage;
pub mod sync;
pub mod utils;

// Re-export commonly used types
pub use git::{Git, GitCli, GitError};
pub use models::{ActiveSession, ConversationRecord, Transcript, TranscriptEntry};
pub use parsers::{parse_transcript, parse_transcript_file};
pub use session::SessionTracker;
pub use storage::{NOTES_REF, NoteStore};
pub use sync::{PullMode, SyncEngine};
