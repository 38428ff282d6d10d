//! System git backend - zero dependencies
//!
//! Shells out to the `git` binary with an isolated environment. Only the two
//! plumbing calls change detection needs: `diff --name-status` and `merge-base`.

use super::{ChangeSet, ChangeSetProvider, DiffRequest};
use crate::core::error::{GitError, RailError, RailResult, ResultExt};
use crate::utils::path_to_git_format;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Git backend using system git (zero crate dependencies)
#[derive(Debug, Clone)]
pub struct SystemGit {
  /// Directory git commands run in by default
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to check `path` is inside a work tree.
  pub fn open(path: &Path) -> RailResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") || stderr.contains("cannot change to") {
        return Err(RailError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(RailError::message(format!("Failed to open git repository: {}", stderr)));
    }

    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Changed files under `cwd`, keyed by `cwd`-joined path.
  ///
  /// Runs `git diff --name-status --relative [<since>] -- [<files>...]`.
  pub fn diff(&self, cwd: &Path, since: Option<&str>, files: &[PathBuf]) -> RailResult<ChangeSet> {
    let mut cmd = self.git_cmd_in(cwd);
    cmd.args(["diff", "--name-status", "--relative"]);
    if let Some(since) = since {
      cmd.arg(since);
    }
    cmd.arg("--");
    for file in files {
      cmd.arg(path_to_git_format(file));
    }

    debug!(cwd = %cwd.display(), since = since.unwrap_or("<index>"), files = files.len(), "git diff");
    let output = cmd.output().context("Failed to run git diff")?;
    let stdout = check_output(output, "git diff --name-status --relative")?;

    Ok(parse_name_status(&stdout, cwd))
  }

  /// Best common ancestor of two commits (`git merge-base a b`)
  pub fn merge_base(&self, a: &str, b: &str) -> RailResult<String> {
    let output = self
      .git_cmd()
      .args(["merge-base", a, b])
      .output()
      .context("Failed to run git merge-base")?;

    let stdout = check_output(output, &format!("git merge-base {} {}", a, b))?;
    Ok(stdout.trim().to_string())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    self.git_cmd_in(&self.repo_path)
  }

  fn git_cmd_in(&self, dir: &Path) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(dir);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}

impl ChangeSetProvider for SystemGit {
  fn changed_files(&self, request: &DiffRequest) -> RailResult<ChangeSet> {
    let cwd = request.cwd.as_deref().unwrap_or(&self.repo_path);
    self.diff(cwd, request.since.as_deref(), &request.files)
  }
}

fn check_output(output: Output, command: &str) -> RailResult<String> {
  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    return Err(RailError::Git(GitError::CommandFailed {
      command: command.to_string(),
      stderr: stderr.to_string(),
    }));
  }
  Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `--name-status` output. Each line is `<status><ws><path>`; renames and
/// copies carry a source and a destination and both are recorded under the same
/// status, so the package a file left counts as changed too. Git separates
/// fields with tabs, which lets paths contain spaces.
fn parse_name_status(stdout: &str, cwd: &Path) -> ChangeSet {
  let mut changes = ChangeSet::new();
  for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
    let fields: Vec<&str> = if line.contains('\t') {
      line.split('\t').collect()
    } else {
      line.split_whitespace().collect()
    };
    if let [status, paths @ ..] = fields.as_slice() {
      for path in paths {
        changes.insert(cwd.join(path), status.to_string());
      }
    }
  }
  changes
}
