//! `impactor dependents` - Show every project that depends on a given one

use super::{OutputFormat, display_path, print_json};
use impactor::core::context::WorkspaceContext;
use impactor::core::error::{ImpactError, ImpactResult};
use impactor::graph::{ChangedProjects, FileOwnership, ProjectGraph};
use serde_json::json;

/// Run the dependents command
pub fn run_dependents(ctx: &WorkspaceContext, project: String, format: String) -> ImpactResult<()> {
  let output_format = OutputFormat::from_str(&format)?;

  // No change annotations are needed to walk edges
  let graph = ProjectGraph::build(&ctx.topology, &FileOwnership::default());
  let query = ChangedProjects::new(&graph);

  let Some(target) = query.find(&project) else {
    return Err(ImpactError::with_help(
      format!("Project '{}' not found", project),
      "Run `impactor projects` to list known names and paths.",
    ));
  };

  let dependents = query.projects_depending_on(target.path());
  let direct: Vec<&str> = target.dependents().iter().map(|p| p.path()).collect();

  match output_format {
    OutputFormat::Text => {
      println!(
        "Projects depending on {}: {}",
        display_path(target.path()),
        dependents.len()
      );
      for dependent in &dependents {
        let marker = if direct.contains(&dependent.path()) { "direct" } else { "transitive" };
        println!("  {} ({})", display_path(dependent.path()), marker);
      }
    }
    OutputFormat::Json => {
      let all: Vec<&str> = dependents.iter().map(|p| p.path()).collect();
      print_json(&json!({
          "project": target.path(),
          "direct": direct,
          "dependents": all
      }))?;
    }
    OutputFormat::NamesOnly => {
      for dependent in &dependents {
        println!("{}", dependent.name());
      }
    }
  }

  Ok(())
}
