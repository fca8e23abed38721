use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::{Transcript, TranscriptEntry};

/// Initial read buffer; lines longer than this grow the buffer as needed
const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Parse a JSONL transcript from a reader.
///
/// Every non-empty line becomes one [`TranscriptEntry`] in source order. Lines that are not
/// valid JSON (or not the expected shape) are kept with empty structured fields and their
/// raw bytes intact. Only I/O errors from the reader fail the parse.
pub fn parse_transcript<R: Read>(reader: R) -> Result<Transcript> {
    let mut reader = BufReader::with_capacity(READ_BUFFER_BYTES, reader);
    let mut entries = Vec::new();
    let mut unstructured = 0;
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).context("Failed to read transcript line")?;
        if read == 0 {
            break;
        }

        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.is_empty() {
            continue;
        }

        let entry = TranscriptEntry::from_raw(line.clone());
        if !entry.is_structured() {
            unstructured += 1;
        }
        entries.push(entry);
    }

    if unstructured > 0 {
        debug!(unstructured, total = entries.len(), "kept transcript lines without structure");
    }

    Ok(Transcript { entries })
}

/// Parse a JSONL transcript file
pub fn parse_transcript_file(path: &Path) -> Result<Transcript> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open transcript file: {}", path.display()))?;
    parse_transcript(file).with_context(|| format!("Failed to parse {}", path.display()))
}

impl Transcript {
    /// Re-emit the original lines joined by `\n`, without a trailing newline
    pub fn to_jsonl(&self) -> Vec<u8> {
        let total: usize = self.entries.iter().map(|e| e.raw.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(&entry.raw);
        }
        out
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
