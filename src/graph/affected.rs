//! Affected project analysis
//!
//! Given a set of changed files, determine:
//! - Which projects directly contain those files
//! - Which projects transitively depend on the changed projects
//! - The closure of both (what needs building/testing)
//!
//! The closure walks reverse edges (petgraph `Incoming` neighbours are the
//! "depends on me" index) from the directly changed set until no new project is
//! reached. Each project enters the affected set at most once, so cycles terminate.
//! The root container (empty path) is only affected by files it owns itself; it is
//! never pulled in, nor walked through, via its dependency edges.

use super::mapper::{FileOwnership, FileToProjectMapper};
use super::project::{ProjectGraph, Topology};
use super::query::ChangedProjects;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Graphs at least this large use the rayon frontier traversal.
pub const PARALLEL_THRESHOLD: usize = 512;

/// Set of affected projects from file changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffectedSet {
  /// Projects directly containing changed files
  pub direct: HashSet<String>,

  /// Projects affected only through a dependency
  pub dependents: HashSet<String>,

  /// Full closure (direct + dependents)
  pub affected: HashSet<String>,
}

impl AffectedSet {
  pub fn is_empty(&self) -> bool {
    self.affected.is_empty()
  }

  pub fn total_affected(&self) -> usize {
    self.affected.len()
  }

  pub fn contains(&self, path: &str) -> bool {
    self.affected.contains(path)
  }

  pub fn sorted_direct(&self) -> Vec<String> {
    sorted(&self.direct)
  }

  pub fn sorted_dependents(&self) -> Vec<String> {
    sorted(&self.dependents)
  }

  pub fn sorted_affected(&self) -> Vec<String> {
    sorted(&self.affected)
  }

  fn from_indices(graph: &ProjectGraph, direct: &[NodeIndex], reached: &[NodeIndex]) -> Self {
    let g = graph.inner();
    let direct: HashSet<String> = direct.iter().map(|&idx| g[idx].path.clone()).collect();
    let affected: HashSet<String> = reached.iter().map(|&idx| g[idx].path.clone()).collect();
    let dependents = affected.difference(&direct).cloned().collect();
    Self {
      direct,
      dependents,
      affected,
    }
  }
}

fn sorted(set: &HashSet<String>) -> Vec<String> {
  let mut v: Vec<String> = set.iter().cloned().collect();
  v.sort();
  v
}

/// Resolve the directly changed paths, ignoring unknown ones, without repeats.
fn resolve_direct<'a>(graph: &ProjectGraph, direct: impl IntoIterator<Item = &'a str>) -> Vec<NodeIndex> {
  let mut seen = HashSet::new();
  let mut resolved = Vec::new();
  for path in direct {
    match graph.index_of(path) {
      Some(idx) => {
        if seen.insert(idx) {
          resolved.push(idx);
        }
      }
      None => debug!(project = %path, "ignoring unknown changed project"),
    }
  }
  resolved
}

/// Compute the affected closure with a breadth-first worklist.
///
/// # Performance
/// O(V + E): every project is queued at most once.
pub fn affected_closure<'a>(graph: &ProjectGraph, direct: impl IntoIterator<Item = &'a str>) -> AffectedSet {
  let direct = resolve_direct(graph, direct);
  let g = graph.inner();

  let mut visited: HashSet<NodeIndex> = direct.iter().copied().collect();
  let mut queue: VecDeque<NodeIndex> = direct.iter().copied().collect();
  let mut reached = direct.clone();

  while let Some(idx) = queue.pop_front() {
    for dependent in g.neighbors_directed(idx, Direction::Incoming) {
      if g[dependent].admits_transitive_change() && visited.insert(dependent) {
        reached.push(dependent);
        queue.push_back(dependent);
      }
    }
  }

  AffectedSet::from_indices(graph, &direct, &reached)
}

/// Compute the affected closure level by level with rayon.
///
/// Each project is claimed through an atomic compare-exchange before its
/// dependents are queued, so it is added exactly once even when several
/// frontier projects reach it in the same round.
pub fn affected_closure_parallel<'a>(graph: &ProjectGraph, direct: impl IntoIterator<Item = &'a str>) -> AffectedSet {
  let direct = resolve_direct(graph, direct);
  let g = graph.inner();

  let claimed: Vec<AtomicBool> = (0..g.node_count()).map(|_| AtomicBool::new(false)).collect();
  let claimed = claimed.as_slice();

  let mut frontier: Vec<NodeIndex> = direct.iter().copied().filter(|&idx| claim(claimed, idx)).collect();
  let mut reached = frontier.clone();

  while !frontier.is_empty() {
    frontier = frontier
      .par_iter()
      .flat_map_iter(move |&idx| {
        g.neighbors_directed(idx, Direction::Incoming)
          .filter(move |&dependent| g[dependent].admits_transitive_change() && claim(claimed, dependent))
      })
      .collect();
    reached.extend_from_slice(&frontier);
  }

  AffectedSet::from_indices(graph, &direct, &reached)
}

/// Mark `idx` as affected; false if another worker got there first.
fn claim(claimed: &[AtomicBool], idx: NodeIndex) -> bool {
  claimed[idx.index()]
    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
    .is_ok()
}

/// Complete affected analysis for one detection cycle.
#[derive(Debug)]
pub struct AffectedAnalysis {
  /// Files that changed, as supplied by the change source
  pub changed_files: Vec<String>,

  /// Project path → files changed directly inside it
  pub ownership: FileOwnership,

  /// Immutable snapshot annotated with direct changes
  pub graph: ProjectGraph,

  /// Impact set
  pub impact: AffectedSet,
}

impl AffectedAnalysis {
  /// Read-only query surface over the snapshot.
  pub fn query(&self) -> ChangedProjects<'_> {
    ChangedProjects::new(&self.graph)
  }
}

/// Analyze which projects are affected by file changes.
///
/// Algorithm:
/// 1. Map files → owning projects
/// 2. Build the snapshot with each project's direct changes
/// 3. Walk dependents of the changed projects to a fixed point
pub fn analyze<S: AsRef<str>>(topology: &Topology, changed_files: &[S]) -> AffectedAnalysis {
  let changed_files: Vec<String> = changed_files.iter().map(|f| f.as_ref().to_string()).collect();

  let ownership = FileToProjectMapper::from_topology(topology).map_files(&changed_files);
  let graph = ProjectGraph::build(topology, &ownership);

  for cycle in graph.find_cycles() {
    warn!(cycle = %cycle.join(" -> "), "dependency cycle between projects");
  }

  let impact = if graph.len() >= PARALLEL_THRESHOLD {
    affected_closure_parallel(&graph, ownership.project_paths())
  } else {
    affected_closure(&graph, ownership.project_paths())
  };

  debug!(
    changed_files = changed_files.len(),
    direct = impact.direct.len(),
    affected = impact.affected.len(),
    "affected analysis complete"
  );

  AffectedAnalysis {
    changed_files,
    ownership,
    graph,
    impact,
  }
}
