use std::env;
use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::cli::hooks::{
    HookContext, HookOutcome, handle_session_end, handle_session_start, handle_store,
    read_payload, run_hook,
};
use crate::git::{Git, GitCli};
use crate::models::HookPayload;
use crate::storage::NoteStore;
use crate::sync::{PullMode, SyncEngine};
use crate::utils::{Settings, init_logging, short_sha};

#[derive(Parser)]
#[command(name = "ai-commit-notes")]
#[command(version = "0.1.0")]
#[command(about = "Attach AI assistant conversations to the git commits they produce", long_about = None)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// SessionStart hook: record the active session (reads hook JSON on stdin)
    SessionStart,
    /// SessionEnd hook: clear the active session (reads hook JSON on stdin)
    SessionEnd,
    /// PostToolUse hook: store the conversation for HEAD after a `git commit`
    Store {
        /// Store for HEAD even without a qualifying tool use (for git post-commit hooks)
        #[arg(long)]
        force: bool,
    },
    /// List commits that carry a conversation
    List,
    /// Print the conversation stored on a commit
    Show {
        /// Commit to inspect
        #[arg(default_value = "HEAD")]
        commit: String,
        /// Print metadata only
        #[arg(long)]
        summary: bool,
    },
    /// Push or fetch conversation notes
    Sync {
        #[command(subcommand)]
        command: SyncCommand,
    },
}

#[derive(Subcommand)]
pub enum SyncCommand {
    /// Push conversation notes to a remote
    Push {
        #[arg(long)]
        remote: Option<String>,
    },
    /// Fetch conversation notes from a remote
    Pull {
        #[arg(long)]
        remote: Option<String>,
        /// Overwrite local notes even when they diverge from the remote (local-only
        /// conversations are lost)
        #[arg(long)]
        force: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Some(Commands::SessionStart) => {
            run_hook("session-start", || hook(false, handle_session_start));
        }
        Some(Commands::SessionEnd) => {
            run_hook("session-end", || hook(true, handle_session_end));
        }
        Some(Commands::Store { force }) => {
            let force = *force;
            run_hook("store", || {
                hook(force, |ctx, payload| handle_store(ctx, payload, force))
            });
        }
        Some(Commands::List) => list_conversations()?,
        Some(Commands::Show { commit, summary }) => show_conversation(commit, *summary)?,
        Some(Commands::Sync { command }) => run_sync(command)?,
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

/// Read the payload from stdin and build the hook context around its `cwd`
fn hook<F>(allow_empty: bool, handler: F) -> Result<HookOutcome>
where
    F: FnOnce(&HookContext<GitCli>, &HookPayload) -> Result<HookOutcome>,
{
    let payload = read_payload(io::stdin().lock(), allow_empty)?;
    let cwd = match &payload.cwd {
        Some(cwd) => cwd.clone(),
        None => env::current_dir().context("Failed to get working directory")?,
    };
    let settings = Settings::from_env();
    let ctx = HookContext::new(GitCli::in_dir(&cwd), cwd, settings.claude_dir);
    handler(&ctx, &payload)
}

fn list_conversations() -> Result<()> {
    let store = NoteStore::new(GitCli::new());
    let commits = store.list_keys()?;

    if commits.is_empty() {
        println!("No conversations stored yet");
        return Ok(());
    }

    for commit in &commits {
        match store.get(commit) {
            Ok(Some(record)) => println!(
                "{}  {}  {} entries  {}",
                short_sha(commit),
                record.session_id,
                record.message_count,
                if record.started_at.is_empty() { "-" } else { record.started_at.as_str() }
            ),
            Ok(None) => {}
            Err(e) => println!("{}  <unreadable: {:#}>", short_sha(commit), e),
        }
    }
    println!();
    println!("{} conversation(s)", commits.len());

    Ok(())
}

fn show_conversation(commit: &str, summary: bool) -> Result<()> {
    let git = GitCli::new();
    let sha = git.resolve_commit(commit).with_context(|| format!("Unknown commit: {}", commit))?;
    let store = NoteStore::new(git);
    let Some(record) = store.get(&sha)? else {
        bail!("No conversation stored for {}", short_sha(&sha));
    };

    let transcript = record.verified_transcript()?;

    if summary {
        println!("Commit:        {}", sha);
        println!("Session:       {}", record.session_id);
        println!("Project:       {}", record.project_path);
        if let Some(branch) = &record.git_branch {
            println!("Branch:        {}", branch);
        }
        println!("Started:       {}", record.started_at);
        println!("Captured:      {}", record.captured_at);
        println!("Entries:       {}", record.message_count);
        println!("Checksum:      {} (verified)", record.checksum);
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(&transcript).context("Failed to write transcript")?;
    stdout.write_all(b"\n").context("Failed to write transcript")?;
    Ok(())
}

fn run_sync(command: &SyncCommand) -> Result<()> {
    let settings = Settings::from_env();
    let engine = SyncEngine::new(GitCli::new());

    match command {
        SyncCommand::Push { remote } => {
            let remote = remote.as_deref().unwrap_or(&settings.default_remote);
            let summary = engine.push(remote)?;
            println!("Pushed {} conversation(s) to {}", summary.conversations, summary.remote);
        }
        SyncCommand::Pull { remote, force } => {
            let remote = remote.as_deref().unwrap_or(&settings.default_remote);
            let mode = if *force { PullMode::Force } else { PullMode::FastForward };
            let summary = engine.pull(remote, mode)?;
            println!("Fetched {} conversation(s) from {}", summary.conversations, summary.remote);
        }
    }

    Ok(())
}
