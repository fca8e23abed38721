use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::debug;

use super::{Git, GitError, GitResult};

/// `git notes show` exit code when the object has no note
const NO_NOTE_EXIT_CODE: i32 = 1;

/// `git notes list` exit code used by older git versions when the notes ref does not exist
const NO_NOTES_REF_EXIT_CODE: i32 = 1;

/// [`Git`] implemented by running the `git` binary
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    workdir: Option<PathBuf>,
}

impl GitCli {
    /// Run git in the process's current directory
    pub fn new() -> Self {
        Self { workdir: None }
    }

    /// Run git as if started in `dir` (`git -C dir`)
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { workdir: Some(dir.into()) }
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        if let Some(dir) = &self.workdir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(args);
        cmd
    }

    fn output(&self, args: &[&str], stdin: Option<&[u8]>) -> GitResult<Output> {
        debug!(?args, "running git");
        let spawn_err = |source| GitError::Spawn { args: args.join(" "), source };

        let mut cmd = self.command(args);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() });

        let mut child = cmd.spawn().map_err(spawn_err)?;
        if let Some(input) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(input).map_err(spawn_err)?;
            }
        }
        child.wait_with_output().map_err(spawn_err)
    }

    /// Run and require success, returning trimmed stdout
    fn run(&self, args: &[&str], stdin: Option<&[u8]>) -> GitResult<String> {
        let output = self.output(args, stdin)?;
        if !output.status.success() {
            return Err(failure(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn failure(args: &[&str], output: &Output) -> GitError {
    GitError::Failed {
        args: args.join(" "),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Parse `git notes list` output (`<note blob> <annotated object>` per line)
fn parse_notes_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

impl Git for GitCli {
    fn repo_root(&self) -> GitResult<PathBuf> {
        self.run(&["rev-parse", "--show-toplevel"], None).map(PathBuf::from)
    }

    fn resolve_commit(&self, rev: &str) -> GitResult<String> {
        let revision = format!("{}^{{commit}}", rev);
        self.run(&["rev-parse", "--verify", &revision], None)
    }

    fn current_branch(&self) -> GitResult<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"], None)
    }

    fn add_note(&self, notes_ref: &str, commit: &str, content: &str) -> GitResult<()> {
        // content goes through stdin: note bodies can exceed argv limits
        self.run(&["notes", "--ref", notes_ref, "add", "-f", "-F", "-", commit], Some(content.as_bytes()))
            .map(|_| ())
    }

    fn show_note(&self, notes_ref: &str, commit: &str) -> GitResult<Option<String>> {
        let args = ["notes", "--ref", notes_ref, "show", commit];
        let output = self.output(&args, None)?;
        if output.status.success() {
            return Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()));
        }
        if output.status.code() == Some(NO_NOTE_EXIT_CODE) {
            return Ok(None);
        }
        Err(failure(&args, &output))
    }

    fn list_noted_commits(&self, notes_ref: &str) -> GitResult<Vec<String>> {
        let args = ["notes", "--ref", notes_ref, "list"];
        let output = self.output(&args, None)?;
        if output.status.success() {
            return Ok(parse_notes_list(&String::from_utf8_lossy(&output.stdout)));
        }
        if output.status.code() == Some(NO_NOTES_REF_EXIT_CODE) {
            debug!(notes_ref, "notes ref does not exist yet");
            return Ok(Vec::new());
        }
        Err(failure(&args, &output))
    }

    fn push_ref(&self, remote: &str, refname: &str) -> GitResult<()> {
        // --no-verify keeps our own pre-push hook from re-triggering a push
        self.run(&["push", "--no-verify", remote, refname], None).map(|_| ())
    }

    fn fetch_ref(&self, remote: &str, refname: &str, force: bool) -> GitResult<()> {
        let refspec = if force { format!("+{0}:{0}", refname) } else { format!("{0}:{0}", refname) };
        self.run(&["fetch", remote, &refspec], None).map(|_| ())
    }
}
