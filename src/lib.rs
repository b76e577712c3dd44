//! Change-impact analysis for monorepos
//!
//! Maps changed files onto the build units (projects) that own them, builds the
//! project dependency graph and computes which projects are affected directly or
//! through a dependency.
//!
//! ```
//! use impactor::graph::{ProjectSpec, Topology, analyze};
//!
//! let topology = Topology::from_specs([
//!   ProjectSpec::new("lib", ":lib", "lib"),
//!   ProjectSpec::new("service", ":service", "service").depends_on([":lib"]),
//! ])?;
//!
//! let analysis = analyze(&topology, &["lib/src/Lib.kt"]);
//! assert_eq!(analysis.query().affected_paths(), vec![":lib", ":service"]);
//! # Ok::<(), impactor::core::error::ImpactError>(())
//! ```

pub mod cargo;
pub mod core;
pub mod graph;
pub mod utils;
