//! Unified workspace context - build once, pass everywhere
//!
//! # Architecture
//!
//! ```text
//! main.rs:
//!   WorkspaceContext::build() -> &WorkspaceContext
//!   |
//!   v
//! commands/affected.rs, dependents.rs, projects.rs:
//!   fn run_*(ctx: &WorkspaceContext, ...)
//! ```

use crate::cargo::metadata::WorkspaceMetadata;
use crate::core::changes::{ChangeSource, DiffRange, ExcludeFilter, GitChangeSource, StaticChangeSource};
use crate::core::config::{ImpactConfig, TopologyProvider};
use crate::core::error::ImpactResult;
use crate::graph::Topology;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Where the changed files of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSpec {
  /// Diff a git range
  Git(DiffRange),
  /// Explicit file list
  Files(Vec<String>),
}

/// Workspace-level data shared by all commands.
///
/// Uses Arc for efficient sharing of the topology without expensive clones.
#[derive(Clone)]
pub struct WorkspaceContext {
  /// Workspace root directory
  pub root: PathBuf,

  /// Configuration (impact.toml, or defaults)
  pub config: Arc<ImpactConfig>,

  /// Project identities and raw dependency edges
  pub topology: Arc<Topology>,
}

impl WorkspaceContext {
  /// Load config, then the topology from the configured provider.
  pub fn build(workspace_root: &Path) -> ImpactResult<Self> {
    let root = workspace_root.to_path_buf();
    let config = ImpactConfig::load(&root)?;

    let topology = match config.workspace.provider {
      TopologyProvider::Cargo => WorkspaceMetadata::load(&root)?.to_topology()?,
      TopologyProvider::Manifest => config.to_topology()?,
    };
    info!(projects = topology.len(), provider = ?config.workspace.provider, "loaded topology");

    Ok(Self {
      root,
      config: Arc::new(config),
      topology: Arc::new(topology),
    })
  }

  /// Get workspace root as Path reference (convenience)
  pub fn workspace_root(&self) -> &Path {
    &self.root
  }

  /// Base ref from config, used when no range is given
  pub fn default_since(&self) -> &str {
    &self.config.changes.since
  }

  /// Collect the changed files for one detection cycle.
  pub fn changed_files(&self, spec: ChangeSpec) -> ImpactResult<Vec<String>> {
    let filter = ExcludeFilter::new(&self.config.changes.exclude)?;
    match spec {
      ChangeSpec::Git(range) => GitChangeSource::open(&self.root, range, filter)?.changed_files(),
      ChangeSpec::Files(files) => StaticChangeSource::new(files, filter).changed_files(),
    }
  }
}
