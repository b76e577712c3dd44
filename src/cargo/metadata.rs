use crate::core::error::{ImpactResult, ResultExt};
use crate::graph::{ProjectSpec, Topology};
use crate::utils::{path_to_git_format, project_path_for_dir};
use cargo_metadata::{MetadataCommand, Package};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Workspace introspection using cargo_metadata
#[derive(Clone)]
pub struct WorkspaceMetadata {
  metadata: cargo_metadata::Metadata,
}

impl WorkspaceMetadata {
  pub fn load(workspace_root: &Path) -> ImpactResult<Self> {
    let metadata = MetadataCommand::new()
      .manifest_path(workspace_root.join("Cargo.toml"))
      .no_deps()
      .exec()
      .with_context(|| format!("Failed to read cargo metadata in {}", workspace_root.display()))?;
    Ok(Self { metadata })
  }

  pub fn list_crates(&self) -> Vec<&Package> {
    self.metadata.workspace_packages()
  }

  pub fn workspace_root(&self) -> &Path {
    self.metadata.workspace_root.as_std_path()
  }

  /// One project per workspace member.
  ///
  /// The member directory (relative to the workspace root) becomes the unit
  /// directory, and its colon form the project path, so a package at the
  /// workspace root is the root project `""`. Edges are dependencies on other
  /// members, of any kind (normal, dev, build).
  pub fn to_topology(&self) -> ImpactResult<Topology> {
    let root = self.workspace_root();
    let members = self.list_crates();

    let mut dirs: HashMap<String, String> = HashMap::with_capacity(members.len());
    for package in &members {
      let manifest_dir = package.manifest_path.parent().map(|p| p.as_std_path()).unwrap_or(root);
      let relative = manifest_dir.strip_prefix(root).unwrap_or(Path::new(""));
      dirs.insert(package.name.as_ref().to_string(), path_to_git_format(relative));
    }

    let mut topology = Topology::new();
    for package in &members {
      let name = package.name.as_ref().to_string();
      let dir = dirs[&name].clone();
      let dependencies: Vec<String> = package
        .dependencies
        .iter()
        .filter(|dep| dep.name != name)
        .filter_map(|dep| dirs.get(&dep.name).map(|d| project_path_for_dir(d)))
        .collect();

      topology.add(ProjectSpec::new(&name, project_path_for_dir(&dir), dir).depends_on(dependencies))?;
    }

    debug!(members = topology.len(), "loaded cargo workspace topology");
    Ok(topology)
  }
}
