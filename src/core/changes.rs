//! Change sources: where the set of changed files comes from
//!
//! A source yields repo-relative, forward-slash paths, deduplicated and already
//! filtered by the exclude patterns. The engine applies no filtering of its own.

use crate::core::error::ImpactResult;
use crate::core::vcs::SystemGit;
use crate::utils::normalize_file_path;
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Anything that can produce the changed-file set for one detection cycle.
pub trait ChangeSource {
  fn changed_files(&self) -> ImpactResult<Vec<String>>;
}

/// Exclude patterns from `[changes] exclude`.
///
/// A pattern containing `/` matches the whole path (`**` crosses directories);
/// otherwise it matches the file name at any depth.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
  patterns: Vec<Pattern>,
}

impl ExcludeFilter {
  pub fn new(patterns: &[String]) -> ImpactResult<Self> {
    let patterns = patterns.iter().map(|p| Pattern::new(p)).collect::<Result<Vec<_>, _>>()?;
    Ok(Self { patterns })
  }

  pub fn is_excluded(&self, path: &str) -> bool {
    let options = MatchOptions {
      require_literal_separator: true,
      ..MatchOptions::new()
    };
    let file_name = path.rsplit('/').next().unwrap_or(path);

    self.patterns.iter().any(|pattern| {
      if pattern.as_str().contains('/') {
        pattern.matches_with(path, options)
      } else {
        pattern.matches_with(file_name, options)
      }
    })
  }

  /// Normalize, drop duplicates (first occurrence wins) and drop excluded paths.
  pub fn apply<S: AsRef<str>>(&self, files: impl IntoIterator<Item = S>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut excluded = 0usize;

    for file in files {
      let path = normalize_file_path(file.as_ref());
      if path.is_empty() || !seen.insert(path.clone()) {
        continue;
      }
      if self.is_excluded(&path) {
        excluded += 1;
        continue;
      }
      kept.push(path);
    }

    if excluded > 0 {
      debug!(excluded, "changed files matched exclude patterns");
    }
    kept
  }
}

/// Which revisions to diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffRange {
  /// `<since>` against HEAD
  Since(String),
  /// `<from>` against `<to>`
  Between { from: String, to: String },
  /// `<base>` against the working tree (includes uncommitted edits)
  WorkingTree(String),
}

/// Changed files from `git diff`.
pub struct GitChangeSource {
  git: SystemGit,
  range: DiffRange,
  filter: ExcludeFilter,
}

impl GitChangeSource {
  pub fn open(workspace_root: &Path, range: DiffRange, filter: ExcludeFilter) -> ImpactResult<Self> {
    let git = SystemGit::open(workspace_root)?;
    debug!(work_tree = %git.work_tree().display(), range = ?range, "opened git change source");
    Ok(Self { git, range, filter })
  }
}

impl ChangeSource for GitChangeSource {
  fn changed_files(&self) -> ImpactResult<Vec<String>> {
    let raw = match &self.range {
      DiffRange::Since(since) => self.git.changed_files(since, Some("HEAD"))?,
      DiffRange::Between { from, to } => self.git.changed_files(from, Some(to))?,
      DiffRange::WorkingTree(base) => self.git.changed_files(base, None)?,
    };
    Ok(self.filter.apply(raw))
  }
}

/// Changed files given explicitly (e.g. `--files` on the command line).
pub struct StaticChangeSource {
  files: Vec<String>,
  filter: ExcludeFilter,
}

impl StaticChangeSource {
  pub fn new(files: Vec<String>, filter: ExcludeFilter) -> Self {
    Self { files, filter }
  }
}

impl ChangeSource for StaticChangeSource {
  fn changed_files(&self) -> ImpactResult<Vec<String>> {
    Ok(self.filter.apply(&self.files))
  }
}
