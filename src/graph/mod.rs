//! Change-impact engine
//!
//! Built on petgraph for direct control and minimal abstraction:
//! - **project**: topology records and the immutable project graph snapshot
//! - **mapper**: changed file → owning project by directory prefix
//! - **affected**: closure of directly changed projects and their dependents
//! - **query**: read-only views over a computed snapshot

pub mod affected;
pub mod mapper;
pub mod project;
pub mod query;

pub use affected::{AffectedAnalysis, AffectedSet, analyze};
pub use mapper::{FileOwnership, FileToProjectMapper};
pub use project::{ProjectGraph, ProjectNode, ProjectRef, ProjectSpec, Topology};
pub use query::{ChangeSummary, ChangedProjects};
