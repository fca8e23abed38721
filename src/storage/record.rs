use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{SecondsFormat, Utc};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};

use crate::models::{ActiveSession, ConversationRecord, RECORD_VERSION, Transcript};

const CHECKSUM_PREFIX: &str = "sha256:";

/// `sha256:<hex>` over `data`
pub fn compute_checksum(data: &[u8]) -> String {
    format!("{}{}", CHECKSUM_PREFIX, hex::encode(Sha256::digest(data)))
}

/// Build the record stored for `commit_sha`.
///
/// The checksum covers the serialized transcript only, so identical session, transcript
/// and commit always produce the same checksum.
pub fn build_record(
    session: &ActiveSession,
    transcript: &Transcript,
    commit_sha: &str,
    git_branch: Option<String>,
) -> Result<ConversationRecord> {
    let jsonl = transcript.to_jsonl();
    Ok(ConversationRecord {
        version: RECORD_VERSION,
        session_id: session.session_id.clone(),
        commit_sha: commit_sha.to_string(),
        captured_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        started_at: session.started_at.clone(),
        project_path: session.project_path.to_string_lossy().into_owned(),
        git_branch,
        message_count: transcript.entry_count(),
        checksum: compute_checksum(&jsonl),
        transcript: encode_transcript(&jsonl)?,
    })
}

/// gzip + base64
pub fn encode_transcript(jsonl: &[u8]) -> Result<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(jsonl).context("Failed to compress transcript")?;
    let compressed = encoder.finish().context("Failed to compress transcript")?;
    Ok(STANDARD.encode(compressed))
}

pub fn decode_transcript(encoded: &str) -> Result<Vec<u8>> {
    let compressed = STANDARD.decode(encoded.trim()).context("Transcript is not valid base64")?;
    let mut out = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut out)
        .context("Failed to decompress transcript")?;
    Ok(out)
}

impl ConversationRecord {
    /// Decode the stored transcript and check it against the checksum
    pub fn verified_transcript(&self) -> Result<Vec<u8>> {
        let jsonl = decode_transcript(&self.transcript)?;
        let actual = compute_checksum(&jsonl);
        if actual != self.checksum {
            bail!(
                "Checksum mismatch for session {}: stored {}, computed {}",
                self.session_id,
                self.checksum,
                actual
            );
        }
        Ok(jsonl)
    }

    pub fn to_note(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize conversation record")
    }

    pub fn from_note(commit_sha: &str, note: &str) -> Result<Self> {
        let mut record: Self = serde_json::from_str(note.trim())
            .with_context(|| format!("Failed to parse conversation note on {}", commit_sha))?;
        record.commit_sha = commit_sha.to_string();
        Ok(record)
    }
}
