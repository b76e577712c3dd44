//! Collaborators around the change-impact engine
//!
//! - **changes**: change sources (git diff, explicit lists) and exclude filtering
//! - **config**: impactor configuration (impact.toml) parsing and validation
//! - **context**: unified workspace context shared by every command
//! - **error**: error types with contextual help messages and exit codes
//! - **vcs**: system git backend

pub mod changes;
pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
