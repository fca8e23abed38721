//! Process-wide log setup.
//!
//! Logs go to stderr: hook commands must keep stdout clean for the assistant, and user
//! commands print their results on stdout.

use tracing_subscriber::EnvFilter;

/// Env var holding an `EnvFilter` directive, e.g. `debug` or `ai_commit_notes=trace`
pub const LOG_ENV_VAR: &str = "AI_COMMIT_NOTES_LOG";

/// Initialise the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
