//! Project topology and the immutable project graph snapshot
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: [`ProjectNode`] (one per build unit, owned by the graph arena)
//! - **Edges**: declared project-to-project dependencies, deduplicated
//! - **Index**: fully qualified path → node, short name → nodes
//!
//! Construction is two-pass: every identity is added first, then edges are
//! resolved against the path index. Nothing is mutated after [`ProjectGraph::build`]
//! returns; a new detection cycle builds a new graph.

use super::mapper::FileOwnership;
use crate::core::error::{ImpactError, ImpactResult, TopologyError};
use crate::utils::escapes_root;
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Raw topology record for one build unit, as supplied by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
  /// Short name, unique only among siblings
  pub name: String,
  /// Fully qualified path (`:libs:core`, root is `""`)
  pub path: String,
  /// Unit directory relative to the repository root (root is `""`)
  pub dir: String,
  /// Fully qualified paths of declared dependencies, in declaration order
  pub dependencies: Vec<String>,
}

impl ProjectSpec {
  pub fn new(name: impl Into<String>, path: impl Into<String>, dir: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      path: path.into(),
      dir: dir.into(),
      dependencies: Vec::new(),
    }
  }

  /// Builder-style dependency declaration
  pub fn depends_on<I, S>(mut self, deps: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.dependencies.extend(deps.into_iter().map(Into::into));
    self
  }
}

/// Ordered set of build-unit identities and raw dependency edges.
///
/// Enforces path uniqueness on insertion so the graph can treat it as an invariant.
#[derive(Debug, Clone, Default)]
pub struct Topology {
  projects: Vec<ProjectSpec>,
  paths: HashSet<String>,
}

impl Topology {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a unit, rejecting duplicate paths and directories outside the root.
  pub fn add(&mut self, spec: ProjectSpec) -> ImpactResult<()> {
    if escapes_root(&spec.dir) {
      return Err(ImpactError::Topology(TopologyError::InvalidDir {
        path: spec.path,
        dir: spec.dir,
      }));
    }
    if !self.paths.insert(spec.path.clone()) {
      return Err(ImpactError::Topology(TopologyError::DuplicatePath { path: spec.path }));
    }
    self.projects.push(spec);
    Ok(())
  }

  /// Build a topology from an iterator of specs.
  pub fn from_specs(specs: impl IntoIterator<Item = ProjectSpec>) -> ImpactResult<Self> {
    let mut topology = Self::new();
    for spec in specs {
      topology.add(spec)?;
    }
    Ok(topology)
  }

  /// Units in provider enumeration order
  pub fn projects(&self) -> &[ProjectSpec] {
    &self.projects
  }

  pub fn len(&self) -> usize {
    self.projects.len()
  }

  pub fn is_empty(&self) -> bool {
    self.projects.is_empty()
  }

  /// `(path, dir)` pairs in enumeration order, the input of the file mapper.
  pub fn unit_dirs(&self) -> impl Iterator<Item = (&str, &str)> {
    self.projects.iter().map(|p| (p.path.as_str(), p.dir.as_str()))
  }
}

/// One build unit inside a [`ProjectGraph`].
///
/// Equality and hashing use the fully qualified path only.
#[derive(Debug, Clone)]
pub struct ProjectNode {
  pub name: String,
  pub path: String,
  pub dir: String,
  /// Files changed directly inside this unit, fixed at construction
  pub changed_files: Vec<String>,
}

impl ProjectNode {
  pub fn has_direct_changes(&self) -> bool {
    !self.changed_files.is_empty()
  }

  /// The root container unit (empty path)
  pub fn is_root(&self) -> bool {
    self.path.is_empty()
  }

  /// Whether this unit may enter the affected set through a dependency.
  ///
  /// The root container is affected only by files it owns directly.
  pub fn admits_transitive_change(&self) -> bool {
    !self.is_root()
  }
}

impl PartialEq for ProjectNode {
  fn eq(&self, other: &Self) -> bool {
    self.path == other.path
  }
}

impl Eq for ProjectNode {}

impl Hash for ProjectNode {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.path.hash(state);
  }
}

/// Immutable snapshot of the monorepo's build units and their dependency edges.
pub struct ProjectGraph {
  graph: DiGraph<ProjectNode, ()>,

  /// Index: fully qualified path → node index
  path_to_node: HashMap<String, NodeIndex>,

  /// Index: short name → node indices (names repeat across subtrees)
  name_to_nodes: HashMap<String, Vec<NodeIndex>>,
}

impl ProjectGraph {
  /// Build the snapshot from a topology and the mapper's ownership map.
  ///
  /// Dependencies on unknown paths are dropped. Repeated edges collapse into one.
  pub fn build(topology: &Topology, ownership: &FileOwnership) -> Self {
    let mut graph = DiGraph::with_capacity(topology.len(), topology.len());
    let mut path_to_node = HashMap::with_capacity(topology.len());
    let mut name_to_nodes: HashMap<String, Vec<NodeIndex>> = HashMap::new();

    // Pass 1: identities
    for spec in topology.projects() {
      let node = ProjectNode {
        name: spec.name.clone(),
        path: spec.path.clone(),
        dir: spec.dir.clone(),
        changed_files: ownership.files_for(&spec.path).to_vec(),
      };
      let idx = graph.add_node(node);
      path_to_node.insert(spec.path.clone(), idx);
      name_to_nodes.entry(spec.name.clone()).or_default().push(idx);
    }

    // Pass 2: edges
    for spec in topology.projects() {
      let from_idx = path_to_node[&spec.path];
      for dep in &spec.dependencies {
        match path_to_node.get(dep) {
          Some(to_idx) => {
            graph.update_edge(from_idx, *to_idx, ());
          }
          None => debug!(project = %spec.path, dependency = %dep, "dropping unresolved dependency"),
        }
      }
    }

    debug!(
      projects = graph.node_count(),
      edges = graph.edge_count(),
      "built project graph"
    );

    Self {
      graph,
      path_to_node,
      name_to_nodes,
    }
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  /// All projects in topology enumeration order.
  pub fn projects(&self) -> impl Iterator<Item = ProjectRef<'_>> {
    self.graph.node_indices().map(move |index| ProjectRef { graph: self, index })
  }

  /// Look up a project by fully qualified path.
  pub fn get(&self, path: &str) -> Option<ProjectRef<'_>> {
    self.index_of(path).map(|index| ProjectRef { graph: self, index })
  }

  /// Look up a project by fully qualified path, falling back to short name.
  ///
  /// When several projects share the short name, the first in enumeration order wins.
  pub fn find(&self, name_or_path: &str) -> Option<ProjectRef<'_>> {
    self.get(name_or_path).or_else(|| {
      self
        .name_to_nodes
        .get(name_or_path)
        .and_then(|nodes| nodes.first())
        .map(|&index| ProjectRef { graph: self, index })
    })
  }

  /// Detect dependency cycles using Tarjan's SCC algorithm.
  ///
  /// Returns components with more than one project, plus self-dependent projects.
  pub fn find_cycles(&self) -> Vec<Vec<String>> {
    algo::tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| component.len() > 1 || self.graph.contains_edge(component[0], component[0]))
      .map(|component| {
        let mut paths: Vec<String> = component.into_iter().map(|idx| self.graph[idx].path.clone()).collect();
        paths.sort();
        paths
      })
      .collect()
  }

  pub(crate) fn index_of(&self, path: &str) -> Option<NodeIndex> {
    self.path_to_node.get(path).copied()
  }

  pub(crate) fn inner(&self) -> &DiGraph<ProjectNode, ()> {
    &self.graph
  }

  /// Neighbours in declaration order (petgraph yields the most recent edge first).
  pub(crate) fn neighbors_ordered(&self, index: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
    let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(index, direction).collect();
    neighbors.reverse();
    neighbors
  }

  /// True if `start` or anything it transitively depends on has direct changes.
  ///
  /// Iterative DFS over outgoing edges; a revisited node contributes nothing.
  /// An unchanged root never propagates, matching the affected closure.
  pub(crate) fn reaches_change(&self, start: NodeIndex) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![start];

    while let Some(idx) = stack.pop() {
      if !visited.insert(idx) {
        continue;
      }
      let node = &self.graph[idx];
      if node.has_direct_changes() {
        return true;
      }
      if !node.admits_transitive_change() {
        continue;
      }
      stack.extend(self.graph.neighbors_directed(idx, Direction::Outgoing));
    }

    false
  }

  /// Every project that transitively depends on `target`, excluding `target` itself.
  pub(crate) fn transitive_dependents(&self, target: NodeIndex) -> HashSet<NodeIndex> {
    let mut visited = HashSet::new();
    let mut stack = vec![target];

    while let Some(idx) = stack.pop() {
      for dependent in self.graph.neighbors_directed(idx, Direction::Incoming) {
        if visited.insert(dependent) {
          stack.push(dependent);
        }
      }
    }

    visited.remove(&target);
    visited
  }
}

impl fmt::Debug for ProjectGraph {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ProjectGraph")
      .field("projects", &self.graph.node_count())
      .field("edges", &self.graph.edge_count())
      .finish()
  }
}

/// Borrowed view of one project, with access to its neighbours in the graph.
#[derive(Clone, Copy)]
pub struct ProjectRef<'g> {
  graph: &'g ProjectGraph,
  index: NodeIndex,
}

impl<'g> ProjectRef<'g> {
  pub fn node(&self) -> &'g ProjectNode {
    &self.graph.graph[self.index]
  }

  pub fn name(&self) -> &'g str {
    &self.node().name
  }

  pub fn path(&self) -> &'g str {
    &self.node().path
  }

  pub fn dir(&self) -> &'g str {
    &self.node().dir
  }

  pub fn changed_files(&self) -> &'g [String] {
    &self.node().changed_files
  }

  /// Declared dependencies that resolved to known projects, in declaration order.
  pub fn dependencies(&self) -> Vec<ProjectRef<'g>> {
    self
      .graph
      .neighbors_ordered(self.index, Direction::Outgoing)
      .into_iter()
      .map(|index| ProjectRef { graph: self.graph, index })
      .collect()
  }

  /// Projects declaring a direct dependency on this one.
  pub fn dependents(&self) -> Vec<ProjectRef<'g>> {
    self
      .graph
      .neighbors_ordered(self.index, Direction::Incoming)
      .into_iter()
      .map(|index| ProjectRef { graph: self.graph, index })
      .collect()
  }

  pub fn has_direct_changes(&self) -> bool {
    self.node().has_direct_changes()
  }

  /// Direct changes, or any dependency (transitively) has changes. Cycle-safe.
  pub fn has_changes(&self) -> bool {
    self.graph.reaches_change(self.index)
  }

  /// Affected only through a dependency, with no files of its own changed.
  pub fn is_transitively_affected(&self) -> bool {
    !self.has_direct_changes() && self.has_changes()
  }

  pub(crate) fn index(&self) -> NodeIndex {
    self.index
  }
}

impl PartialEq for ProjectRef<'_> {
  fn eq(&self, other: &Self) -> bool {
    self.node() == other.node()
  }
}

impl Eq for ProjectRef<'_> {}

impl fmt::Debug for ProjectRef<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ProjectRef")
      .field("path", &self.path())
      .field("changed_files", &self.changed_files().len())
      .finish()
  }
}
