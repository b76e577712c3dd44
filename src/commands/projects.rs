//! `impactor projects` - List the loaded topology

use super::{OutputFormat, display_path, print_json};
use impactor::core::context::WorkspaceContext;
use impactor::core::error::ImpactResult;
use serde_json::json;

/// Run the projects command
pub fn run_projects(ctx: &WorkspaceContext, format: String) -> ImpactResult<()> {
  let output_format = OutputFormat::from_str(&format)?;
  let projects = ctx.topology.projects();

  match output_format {
    OutputFormat::Text => {
      println!("Projects: {}", projects.len());
      for project in projects {
        let dir = if project.dir.is_empty() { "." } else { project.dir.as_str() };
        println!("  {} [{}] ({})", display_path(&project.path), project.name, dir);
        for dep in &project.dependencies {
          println!("    -> {}", display_path(dep));
        }
      }
    }
    OutputFormat::Json => {
      let entries: Vec<serde_json::Value> = projects
        .iter()
        .map(|p| {
          json!({
              "name": p.name,
              "path": p.path,
              "dir": p.dir,
              "dependencies": p.dependencies
          })
        })
        .collect();
      print_json(&json!({ "projects": entries }))?;
    }
    OutputFormat::NamesOnly => {
      for project in projects {
        println!("{}", project.name);
      }
    }
  }

  Ok(())
}
