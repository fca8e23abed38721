//! Conversation records and their commit-addressed store.
//!
//! Records live as git notes under a single ref, [`NOTES_REF`]. Every clone that shares
//! conversations must use the same ref name, and the repository should list it in
//! `notes.displayRef` and `notes.rewriteRef` so notes show in `git log` and follow
//! rebased commits.

pub mod notes;
pub mod record;

pub use notes::NoteStore;
pub use record::{build_record, compute_checksum, decode_transcript, encode_transcript};

/// The notes ref holding one conversation record per commit
pub const NOTES_REF: &str = "refs/notes/claude-conversations";
