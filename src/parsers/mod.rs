//! JSONL transcript codec
//!
//! # Error Handling Strategy
//!
//! Transcripts are stored verbatim, so the parser is **lossless** rather than selective:
//!
//! - **Individual line failures**: a line that is not valid JSON, or not the expected entry
//!   shape, is still kept. Its structured fields stay empty and its raw bytes are preserved.
//!
//! - **Stream failures**: only I/O errors from the underlying reader abort a parse.
//!
//! - **Round trip**: re-serializing a parsed transcript reproduces the input byte for byte
//!   (for `\n`-separated input without blank lines or a trailing newline).

pub mod deserializers;
pub mod transcript;

pub use transcript::{parse_transcript, parse_transcript_file};
