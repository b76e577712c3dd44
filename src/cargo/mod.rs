//! Cargo workspace integration
//!
//! - **metadata**: build a project topology from `cargo metadata`

pub mod metadata;
