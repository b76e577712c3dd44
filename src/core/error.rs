//! Error types for impactor with contextual messages and exit codes
//!
//! The engine itself never fails on data that merely does not match something
//! (unknown dependency, file outside every unit). Errors only come from the
//! collaborators around it: config loading, git, topology providers.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for impactor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, bad topology)
  User = 1,
  /// System error (git, cargo, I/O)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for impactor
#[derive(Debug)]
pub enum ImpactError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Topology input rejected before it reaches the engine
  Topology(TopologyError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ImpactError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ImpactError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ImpactError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ImpactError::Message { message, context, help } => ImpactError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ImpactError::Io(err) => ImpactError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ImpactError::Config(_) => ExitCode::User,
      ImpactError::Topology(_) => ExitCode::User,
      ImpactError::Git(_) => ExitCode::System,
      ImpactError::Io(_) => ExitCode::System,
      ImpactError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ImpactError::Config(e) => e.help_message(),
      ImpactError::Git(e) => e.help_message(),
      ImpactError::Topology(e) => e.help_message(),
      ImpactError::Message { help, .. } => help.clone(),
      ImpactError::Io(_) => None,
    }
  }
}

impl fmt::Display for ImpactError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ImpactError::Config(e) => write!(f, "{}", e),
      ImpactError::Git(e) => write!(f, "{}", e),
      ImpactError::Topology(e) => write!(f, "{}", e),
      ImpactError::Io(e) => write!(f, "I/O error: {}", e),
      ImpactError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ImpactError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ImpactError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ImpactError {
  fn from(err: io::Error) -> Self {
    ImpactError::Io(err)
  }
}

impl From<String> for ImpactError {
  fn from(msg: String) -> Self {
    ImpactError::message(msg)
  }
}

impl From<&str> for ImpactError {
  fn from(msg: &str) -> Self {
    ImpactError::message(msg)
  }
}

impl From<cargo_metadata::Error> for ImpactError {
  fn from(err: cargo_metadata::Error) -> Self {
    ImpactError::message(format!("Cargo metadata error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ImpactError {
  fn from(err: toml_edit::de::Error) -> Self {
    ImpactError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ImpactError {
  fn from(err: serde_json::Error) -> Self {
    ImpactError::message(format!("JSON error: {}", err))
  }
}

impl From<glob::PatternError> for ImpactError {
  fn from(err: glob::PatternError) -> Self {
    ImpactError::message(format!("Invalid glob pattern: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config file exists but is unusable
  Invalid { path: PathBuf, reason: String },

  /// Missing required field
  MissingField { field: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Invalid { .. } => Some("Fix impact.toml or remove it to fall back to defaults.".to_string()),
      ConfigError::MissingField { field } => Some(format!("Add `{}` to impact.toml.", field)),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::CommandFailed { stderr, .. } => {
        if stderr.contains("unknown revision") || stderr.contains("bad revision") {
          Some("Check that the base ref exists locally (try `git fetch`), or pass --since/--from explicitly.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run impactor inside a git repository or pass --root: {}",
        path.display()
      )),
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Topology errors raised by providers before the graph is built
#[derive(Debug)]
pub enum TopologyError {
  /// Two units share one fully qualified path
  DuplicatePath { path: String },

  /// A unit directory escapes the repository root
  InvalidDir { path: String, dir: String },
}

impl TopologyError {
  fn help_message(&self) -> Option<String> {
    match self {
      TopologyError::DuplicatePath { .. } => {
        Some("Fully qualified project paths must be unique across the whole repository.".to_string())
      }
      TopologyError::InvalidDir { .. } => Some("Project directories must be relative to the repository root.".to_string()),
    }
  }
}

impl fmt::Display for TopologyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TopologyError::DuplicatePath { path } => write!(f, "Duplicate project path '{}'", path),
      TopologyError::InvalidDir { path, dir } => {
        write!(f, "Project '{}' has invalid directory '{}'", path, dir)
      }
    }
  }
}

/// Result type alias for impactor
pub type ImpactResult<T> = Result<T, ImpactError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ImpactResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ImpactResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ImpactError>,
{
  fn context(self, ctx: impl Into<String>) -> ImpactResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ImpactResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ImpactError) {
  eprintln!("\nerror: {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("help: {}\n", help);
  }
}
