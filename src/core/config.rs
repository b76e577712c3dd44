use crate::core::error::{ConfigError, ImpactError, ImpactResult, ResultExt};
use crate::graph::{ProjectSpec, Topology};
use crate::utils::dir_for_project_path;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for impactor
/// Searched in order: impact.toml, .impact.toml, .config/impact.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImpactConfig {
  #[serde(default)]
  pub workspace: WorkspaceConfig,
  #[serde(default)]
  pub changes: ChangesConfig,
  #[serde(default)]
  pub projects: Vec<ProjectConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
  /// Where the project topology comes from
  #[serde(default)]
  pub provider: TopologyProvider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyProvider {
  /// Workspace members from `cargo metadata`
  #[default]
  Cargo,
  /// `[[projects]]` entries of this file
  Manifest,
}

/// Change source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangesConfig {
  /// Base ref to diff against (default: "origin/main")
  #[serde(default = "default_since")]
  pub since: String,

  /// Glob patterns for files that never count as changes.
  /// Patterns without a `/` match the file name anywhere in the tree.
  #[serde(default)]
  pub exclude: Vec<String>,
}

fn default_since() -> String {
  "origin/main".to_string()
}

impl Default for ChangesConfig {
  fn default() -> Self {
    Self {
      since: default_since(),
      exclude: Vec::new(),
    }
  }
}

/// One build unit declared by hand
///
/// # Example
///
/// ```toml
/// [[projects]]
/// name = "app"
/// path = ":app"
/// dir = "app"             # optional, derived from path
/// dependencies = [":lib"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
  pub name: String,
  pub path: String,
  #[serde(default)]
  pub dir: Option<String>,
  #[serde(default)]
  pub dependencies: Vec<String>,
}

impl ProjectConfig {
  /// Explicit directory, or the one implied by the colon path.
  pub fn dir(&self) -> String {
    self.dir.clone().unwrap_or_else(|| dir_for_project_path(&self.path))
  }
}

impl ImpactConfig {
  /// Find config file in search order: impact.toml, .impact.toml, .config/impact.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("impact.toml"),
      path.join(".impact.toml"),
      path.join(".config").join("impact.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists.
  pub fn load(path: &Path) -> ImpactResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      debug!(root = %path.display(), "no impact.toml found, using defaults");
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.validate().map_err(|reason| {
      ImpactError::Config(ConfigError::Invalid {
        path: config_path.clone(),
        reason,
      })
    })?;

    debug!(path = %config_path.display(), provider = ?config.workspace.provider, "loaded config");
    Ok(config)
  }

  pub fn parse(content: &str) -> ImpactResult<Self> {
    Ok(toml_edit::de::from_str(content)?)
  }

  /// Check exclude patterns compile and manual projects are usable.
  pub fn validate(&self) -> Result<(), String> {
    for pattern in &self.changes.exclude {
      glob::Pattern::new(pattern).map_err(|e| format!("exclude pattern '{}': {}", pattern, e))?;
    }

    if self.workspace.provider == TopologyProvider::Manifest && self.projects.is_empty() {
      return Err("provider = \"manifest\" requires at least one [[projects]] entry".to_string());
    }

    Ok(())
  }

  /// Topology from `[[projects]]`, for the manifest provider.
  pub fn to_topology(&self) -> ImpactResult<Topology> {
    if self.projects.is_empty() {
      return Err(ImpactError::Config(ConfigError::MissingField {
        field: "[[projects]]".to_string(),
      }));
    }

    Topology::from_specs(
      self
        .projects
        .iter()
        .map(|p| ProjectSpec::new(&p.name, &p.path, p.dir()).depends_on(p.dependencies.iter().cloned())),
    )
  }
}
