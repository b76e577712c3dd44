//! Changed file → owning project mapping
//!
//! Ownership is by directory prefix. The root unit (empty directory) is special:
//! it only owns files that fall outside every other unit's directory. Nested
//! non-root units are not disambiguated, so a file under `a/b/` belongs to both
//! `a` and `a/b` when both are units.

use super::project::Topology;
use crate::utils::normalize_unit_dir;
use std::collections::HashMap;
use tracing::debug;

/// Unit path → files changed directly inside it.
///
/// Iteration follows the topology's enumeration order; file order per unit
/// follows the order the change source produced them in. Units with no files
/// are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOwnership {
  entries: Vec<(String, Vec<String>)>,
  index: HashMap<String, usize>,
}

impl FileOwnership {
  fn push(&mut self, path: String, files: Vec<String>) {
    self.index.insert(path.clone(), self.entries.len());
    self.entries.push((path, files));
  }

  /// Files owned by `path`; empty when the unit has no changes or is unknown.
  pub fn files_for(&self, path: &str) -> &[String] {
    self
      .index
      .get(path)
      .map(|&i| self.entries[i].1.as_slice())
      .unwrap_or_default()
  }

  pub fn contains(&self, path: &str) -> bool {
    self.index.contains_key(path)
  }

  /// Paths of units owning at least one changed file.
  pub fn project_paths(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(path, _)| path.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
    self.entries.iter().map(|(path, files)| (path.as_str(), files.as_slice()))
  }

  /// Number of units with changes
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[derive(Debug, Clone)]
struct UnitPrefix {
  path: String,
  /// Normalized, slash-terminated directory; empty for the root unit
  prefix: String,
}

impl UnitPrefix {
  fn is_root(&self) -> bool {
    self.prefix.is_empty()
  }
}

/// Maps changed files to the units whose directories contain them.
#[derive(Debug, Clone)]
pub struct FileToProjectMapper {
  units: Vec<UnitPrefix>,
}

impl FileToProjectMapper {
  /// Build from `(project path, unit directory)` pairs in enumeration order.
  pub fn new<'a>(units: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
    let units = units
      .into_iter()
      .map(|(path, dir)| UnitPrefix {
        path: path.to_string(),
        prefix: normalize_unit_dir(dir),
      })
      .collect();
    Self { units }
  }

  pub fn from_topology(topology: &Topology) -> Self {
    Self::new(topology.unit_dirs())
  }

  /// Paths of every unit owning `file`, in enumeration order.
  pub fn owners(&self, file: &str) -> Vec<&str> {
    self
      .owning_slots(file)
      .map(|slot| self.units[slot].path.as_str())
      .collect()
  }

  /// Indices of owning units. The root only owns files no other unit claims.
  fn owning_slots<'m>(&'m self, file: &'m str) -> impl Iterator<Item = usize> + 'm {
    let nested = self.units.iter().any(|u| !u.is_root() && file.starts_with(&u.prefix));

    self.units.iter().enumerate().filter_map(move |(slot, u)| {
      let owns = if u.is_root() { !nested } else { file.starts_with(&u.prefix) };
      owns.then_some(slot)
    })
  }

  /// Map every changed file onto its owners. Files with no owner are dropped.
  pub fn map_files<S: AsRef<str>>(&self, files: &[S]) -> FileOwnership {
    let mut per_unit: Vec<Vec<String>> = vec![Vec::new(); self.units.len()];
    let mut unowned = 0usize;

    for file in files {
      let file = file.as_ref();
      let mut owned = false;
      for slot in self.owning_slots(file) {
        per_unit[slot].push(file.to_string());
        owned = true;
      }
      if !owned {
        unowned += 1;
      }
    }

    if unowned > 0 {
      debug!(unowned, "changed files outside every project were dropped");
    }

    let mut ownership = FileOwnership::default();
    for (unit, files) in self.units.iter().zip(per_unit) {
      if !files.is_empty() {
        ownership.push(unit.path.clone(), files);
      }
    }
    ownership
  }
}
