//! Read-only queries over a computed change snapshot
//!
//! [`ChangedProjects`] holds nothing but a borrow of the [`ProjectGraph`]; every
//! answer is derived on demand. Lookups that find nothing return empty results.

use super::affected::affected_closure;
use super::project::{ProjectGraph, ProjectRef};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Aggregate view of one detection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
  pub total_projects: usize,
  pub directly_changed_count: usize,
  pub affected_count: usize,
  pub total_changed_files: usize,
  pub directly_changed_paths: Vec<String>,
  pub affected_paths: Vec<String>,
}

/// Query façade over an annotated project snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ChangedProjects<'g> {
  graph: &'g ProjectGraph,
}

impl<'g> ChangedProjects<'g> {
  pub fn new(graph: &'g ProjectGraph) -> Self {
    Self { graph }
  }

  /// All projects in enumeration order.
  pub fn projects(&self) -> impl Iterator<Item = ProjectRef<'g>> + 'g {
    self.graph.projects()
  }

  /// Projects with changes of their own or through any dependency.
  pub fn affected_projects(&self) -> Vec<ProjectRef<'g>> {
    let direct: Vec<&str> = self.directly_changed_projects().iter().map(|p| p.path()).collect();
    let closure = affected_closure(self.graph, direct);
    self.projects().filter(|p| closure.contains(p.path())).collect()
  }

  pub fn affected_paths(&self) -> Vec<String> {
    self.affected_projects().iter().map(|p| p.path().to_string()).collect()
  }

  pub fn affected_names(&self) -> Vec<String> {
    self.affected_projects().iter().map(|p| p.name().to_string()).collect()
  }

  pub fn affected_count(&self) -> usize {
    self.affected_projects().len()
  }

  /// Projects with at least one changed file of their own.
  pub fn directly_changed_projects(&self) -> Vec<ProjectRef<'g>> {
    self.projects().filter(|p| p.has_direct_changes()).collect()
  }

  pub fn directly_changed_paths(&self) -> Vec<String> {
    self
      .directly_changed_projects()
      .iter()
      .map(|p| p.path().to_string())
      .collect()
  }

  /// Affected only through a dependency.
  pub fn transitively_affected_paths(&self) -> Vec<String> {
    self
      .affected_projects()
      .iter()
      .filter(|p| !p.has_direct_changes())
      .map(|p| p.path().to_string())
      .collect()
  }

  /// Exact match on fully qualified path, then on short name.
  pub fn find(&self, name_or_path: &str) -> Option<ProjectRef<'g>> {
    self.graph.find(name_or_path)
  }

  /// Affected projects whose path starts with `prefix` (plain string prefix).
  pub fn affected_with_prefix(&self, prefix: &str) -> Vec<ProjectRef<'g>> {
    self
      .affected_projects()
      .into_iter()
      .filter(|p| p.path().starts_with(prefix))
      .collect()
  }

  /// Path → number of files changed directly inside that project.
  ///
  /// Every project is present, including those with zero changes.
  pub fn changed_file_counts(&self) -> BTreeMap<String, usize> {
    self
      .projects()
      .map(|p| (p.path().to_string(), p.changed_files().len()))
      .collect()
  }

  /// Every directly changed file across all projects, deduplicated.
  pub fn all_changed_files(&self) -> BTreeSet<String> {
    self
      .projects()
      .flat_map(|p| p.changed_files().iter().cloned())
      .collect()
  }

  /// Sum of per-project direct change counts (not deduplicated).
  pub fn total_changed_file_count(&self) -> usize {
    self.projects().map(|p| p.changed_files().len()).sum()
  }

  /// Projects whose dependency closure contains the project named by `name_or_path`.
  ///
  /// The target itself is never part of the result, even inside a cycle.
  pub fn projects_depending_on(&self, name_or_path: &str) -> Vec<ProjectRef<'g>> {
    let Some(target) = self.find(name_or_path) else {
      return Vec::new();
    };
    let dependents: HashSet<_> = self.graph.transitive_dependents(target.index());
    self.projects().filter(|p| dependents.contains(&p.index())).collect()
  }

  pub fn summary(&self) -> ChangeSummary {
    self.summary_with_prefix("")
  }

  /// Summary restricted to projects whose path starts with `prefix`.
  ///
  /// Every count and list is scoped the same way as [`Self::affected_with_prefix`].
  pub fn summary_with_prefix(&self, prefix: &str) -> ChangeSummary {
    let in_scope: Vec<ProjectRef<'g>> = self.projects().filter(|p| p.path().starts_with(prefix)).collect();
    let directly_changed_paths: Vec<String> = in_scope
      .iter()
      .filter(|p| p.has_direct_changes())
      .map(|p| p.path().to_string())
      .collect();
    let affected_paths: Vec<String> = self
      .affected_with_prefix(prefix)
      .iter()
      .map(|p| p.path().to_string())
      .collect();

    ChangeSummary {
      total_projects: in_scope.len(),
      directly_changed_count: directly_changed_paths.len(),
      affected_count: affected_paths.len(),
      total_changed_files: in_scope.iter().map(|p| p.changed_files().len()).sum(),
      directly_changed_paths,
      affected_paths,
    }
  }
}
