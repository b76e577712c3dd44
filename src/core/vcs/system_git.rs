//! System git backend
//!
//! Uses git plumbing through a subprocess with an isolated environment. Only the
//! operations the change source needs live here.

use crate::core::error::{GitError, ImpactError, ImpactResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Git backend using system git
pub struct SystemGit {
  /// Directory git runs in; diff paths are reported relative to it
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> ImpactResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ImpactError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ImpactError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Files changed between two revisions, or between `from` and the working tree.
  ///
  /// Paths are relative to the directory the repository was opened at; files
  /// outside it are not reported. Renames are listed as delete + add so both
  /// sides count.
  pub fn changed_files(&self, from: &str, to: Option<&str>) -> ImpactResult<Vec<String>> {
    let mut cmd = self.git_cmd();
    cmd.args(["diff", "--name-only", "--no-renames", "--relative", from]);
    if let Some(to) = to {
      cmd.arg(to);
    }
    cmd.arg("--");

    let range = match to {
      Some(to) => format!("{} {}", from, to),
      None => from.to_string(),
    };

    let output = cmd.output().context("Failed to run git diff")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ImpactError::Git(GitError::CommandFailed {
        command: format!("git diff --name-only {}", range),
        stderr: stderr.to_string(),
      }));
    }

    let files: Vec<String> = String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();

    debug!(range = %range, files = files.len(), "collected changed files from git");
    Ok(files)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

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
