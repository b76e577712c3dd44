//! Path helpers shared by the mapper, the change sources and the topology providers
//!
//! Every path handled by the engine is a repo-relative string with forward slashes.
//! Project paths are colon-delimited (`:libs:core`), with the root project at `""`.

use std::path::Path;

/// Separator between segments of a fully qualified project path
pub const PROJECT_PATH_SEPARATOR: char = ':';

/// Convert a path to Git format (always forward slashes)
///
/// Git expects paths with forward slashes, even on Windows.
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}

/// Normalize a changed file path: forward slashes, no leading `./` or `/`.
pub fn normalize_file_path(path: &str) -> String {
  let unified = path.replace('\\', "/");
  let mut trimmed = unified.as_str();
  loop {
    if let Some(rest) = trimmed.strip_prefix("./") {
      trimmed = rest;
    } else if let Some(rest) = trimmed.strip_prefix('/') {
      trimmed = rest;
    } else {
      break;
    }
  }
  trimmed.to_string()
}

/// Normalize a unit directory into an ownership prefix.
///
/// Empty and `.` segments are dropped and a trailing `/` is appended, except for
/// the root unit whose prefix is the empty string.
///
/// ```
/// use impactor::utils::normalize_unit_dir;
///
/// assert_eq!(normalize_unit_dir("/libs\\core"), "libs/core/");
/// assert_eq!(normalize_unit_dir("app/./src/."), "app/src/");
/// assert_eq!(normalize_unit_dir(""), "");
/// assert_eq!(normalize_unit_dir("."), "");
/// ```
pub fn normalize_unit_dir(dir: &str) -> String {
  let unified = dir.replace('\\', "/");
  let segments: Vec<&str> = unified.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
  if segments.is_empty() {
    return String::new();
  }
  format!("{}/", segments.join("/"))
}

/// Derive the fully qualified project path for a repo-relative directory.
///
/// `""` maps to the root path `""`, `crates/core` maps to `:crates:core`.
pub fn project_path_for_dir(dir: &str) -> String {
  let prefix = normalize_unit_dir(dir);
  let segments: Vec<&str> = prefix.split('/').filter(|s| !s.is_empty()).collect();
  if segments.is_empty() {
    return String::new();
  }
  let mut path = String::new();
  for segment in segments {
    path.push(PROJECT_PATH_SEPARATOR);
    path.push_str(segment);
  }
  path
}

/// Derive the conventional directory for a fully qualified project path.
///
/// Inverse of [`project_path_for_dir`]: `:crates:core` maps to `crates/core`.
pub fn dir_for_project_path(path: &str) -> String {
  path
    .split(PROJECT_PATH_SEPARATOR)
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("/")
}

/// True if a relative directory tries to leave the repository root.
pub fn escapes_root(dir: &str) -> bool {
  normalize_file_path(dir).split('/').any(|segment| segment == "..")
}
