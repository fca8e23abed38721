/// Sync integration tests against real repositories and a bare remote
///
/// These tests verify that conversations survive a push from one clone and a fetch into another
mod common;

use std::path::PathBuf;

use ai_commit_notes::git::GitCli;
use ai_commit_notes::models::ActiveSession;
use ai_commit_notes::parsers::parse_transcript;
use ai_commit_notes::storage::{NoteStore, build_record};
use ai_commit_notes::sync::{PullMode, SyncEngine};
use common::{TempRepo, TranscriptBuilder, commit_transcript};

fn store_conversation(repo: &TempRepo, commit: &str, session_id: &str, jsonl: &str) -> String {
    let session = ActiveSession {
        session_id: session_id.to_string(),
        transcript_path: PathBuf::from("/unused.jsonl"),
        started_at: "2025-01-15T10:30:00Z".to_string(),
        project_path: repo.path().to_path_buf(),
    };
    let transcript = parse_transcript(jsonl.as_bytes()).unwrap();
    let record = build_record(&session, &transcript, commit, Some("main".to_string())).unwrap();
    NoteStore::new(GitCli::in_dir(repo.path())).add(commit, &record).unwrap();
    record.checksum
}

#[test]
fn test_sync_cross_clone_round_trip() {
    let a = TempRepo::new();
    let remote = a.add_bare_remote("origin");
    let commit = a.head();
    // includes a line that is not JSON; it must come back byte for byte
    let jsonl = commit_transcript().raw("not json at all").to_jsonl();
    let checksum = store_conversation(&a, &commit, "session-a", &jsonl);

    let summary = SyncEngine::new(GitCli::in_dir(a.path())).push("origin").unwrap();
    assert_eq!(summary.conversations, 1);
    assert_eq!(summary.remote, "origin");

    let b = TempRepo::clone_from(remote.path());
    let b_sync = SyncEngine::new(GitCli::in_dir(b.path()));
    assert!(!b_sync.store().has(&commit), "notes are not part of a plain clone");

    let summary = b_sync.pull("origin", PullMode::FastForward).unwrap();
    assert_eq!(summary.conversations, 1);

    let record = b_sync.store().get(&commit).unwrap().expect("record should be fetched");
    assert_eq!(record.checksum, checksum);
    assert_eq!(record.commit_sha, commit);
    assert_eq!(record.session_id, "session-a");
    assert_eq!(record.verified_transcript().unwrap(), jsonl.as_bytes());
}

#[test]
fn test_sync_pull_extends_existing_notes() {
    let a = TempRepo::new();
    let remote = a.add_bare_remote("origin");
    let first = a.head();
    store_conversation(&a, &first, "first", &commit_transcript().to_jsonl());
    let a_sync = SyncEngine::new(GitCli::in_dir(a.path()));
    a_sync.push("origin").unwrap();

    let b = TempRepo::clone_from(remote.path());
    let b_sync = SyncEngine::new(GitCli::in_dir(b.path()));
    b_sync.pull("origin", PullMode::FastForward).unwrap();

    let second = a.commit("second");
    a.git(&["push", "-q", "origin", "main"]);
    store_conversation(&a, &second, "second", &TranscriptBuilder::new().user("u", "hi").to_jsonl());
    assert_eq!(a_sync.push("origin").unwrap().conversations, 2);

    b.git(&["pull", "-q", "origin", "main"]);
    assert_eq!(b_sync.pull("origin", PullMode::FastForward).unwrap().conversations, 2);
    assert_eq!(b_sync.store().get(&second).unwrap().unwrap().session_id, "second");
}

#[test]
fn test_sync_push_without_notes_fails() {
    let a = TempRepo::new();
    let _remote = a.add_bare_remote("origin");

    let err = SyncEngine::new(GitCli::in_dir(a.path())).push("origin").unwrap_err();
    assert!(format!("{:#}", err).contains("does not match any"), "got: {:#}", err);
}

#[test]
fn test_sync_pull_when_remote_has_no_notes_fails() {
    let a = TempRepo::new();
    let _remote = a.add_bare_remote("origin");

    let err = SyncEngine::new(GitCli::in_dir(a.path()))
        .pull("origin", PullMode::FastForward)
        .unwrap_err();
    assert!(format!("{:#}", err).contains("couldn't find remote ref"), "got: {:#}", err);
}

#[test]
fn test_sync_diverged_notes_need_force() {
    let a = TempRepo::new();
    let remote = a.add_bare_remote("origin");
    let commit = a.head();
    let b = TempRepo::clone_from(remote.path());

    store_conversation(&a, &commit, "from-a", &commit_transcript().to_jsonl());
    SyncEngine::new(GitCli::in_dir(a.path())).push("origin").unwrap();
    store_conversation(&b, &commit, "from-b", &commit_transcript().to_jsonl());

    let b_sync = SyncEngine::new(GitCli::in_dir(b.path()));
    assert!(b_sync.pull("origin", PullMode::FastForward).is_err());
    assert_eq!(b_sync.store().get(&commit).unwrap().unwrap().session_id, "from-b");

    // diverged local notes cannot be pushed over the remote either
    assert!(b_sync.push("origin").is_err());

    b_sync.pull("origin", PullMode::Force).unwrap();
    assert_eq!(b_sync.store().get(&commit).unwrap().unwrap().session_id, "from-a");
}

#[test]
fn test_sync_unknown_remote_fails() {
    let a = TempRepo::new();
    store_conversation(&a, &a.head(), "s", &commit_transcript().to_jsonl());

    let engine = SyncEngine::new(GitCli::in_dir(a.path()));
    assert!(engine.push("nowhere").is_err());
    assert!(engine.pull("nowhere", PullMode::FastForward).is_err());
}

#[test]
#[cfg(unix)] // Hook scripts need the executable bit
fn test_sync_push_skips_pre_push_hook() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::process::Command;

    let a = TempRepo::new();
    let _remote = a.add_bare_remote("origin");

    let hooks = tempfile::TempDir::new().unwrap();
    let hook = hooks.path().join("pre-push");
    fs::write(&hook, "#!/bin/sh\necho pre-push hook ran\nexit 1\n").unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();
    a.git(&["config", "core.hooksPath", &hooks.path().to_string_lossy()]);

    // the hook is live for ordinary pushes
    let second = a.commit("second");
    let plain = Command::new("git")
        .args(["push", "-q", "origin", "main"])
        .current_dir(a.path())
        .output()
        .unwrap();
    assert!(!plain.status.success());
    assert!(String::from_utf8_lossy(&plain.stderr).contains("pre-push hook ran"));

    store_conversation(&a, &second, "s", &commit_transcript().to_jsonl());
    let summary = SyncEngine::new(GitCli::in_dir(a.path())).push("origin").unwrap();
    assert_eq!(summary.conversations, 1);
}
