//! CLI commands for impactor
//!
//! - **affected**: projects affected by a set of changed files
//! - **dependents**: projects that (transitively) depend on one project
//! - **projects**: the loaded topology
//!
//! All commands accept `&WorkspaceContext` to avoid redundant workspace loads.

pub mod affected;
pub mod dependents;
pub mod projects;

pub use affected::{AffectedArgs, run_affected};
pub use dependents::run_dependents;
pub use projects::run_projects;

use impactor::core::error::{ImpactError, ImpactResult};

/// Output format shared by all commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Text,
  Json,
  NamesOnly,
}

impl OutputFormat {
  pub fn from_str(s: &str) -> ImpactResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::NamesOnly),
      _ => Err(ImpactError::with_help(
        format!("Unknown format '{}'", s),
        "Valid formats: text, json, names-only",
      )),
    }
  }
}

/// Print a JSON value the way every command does
pub fn print_json(value: &serde_json::Value) -> ImpactResult<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

/// Project path as shown to humans; the root path is empty
pub fn display_path(path: &str) -> &str {
  if path.is_empty() { "<root>" } else { path }
}
