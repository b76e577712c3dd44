//! `impactor affected` - Show which projects are affected by changes
//!
//! This command collects changed files (git diff or an explicit list) and determines:
//! - Which projects directly contain changed files
//! - Which projects transitively depend on those changed projects
//! - The full set that needs building/testing

use super::{OutputFormat, display_path, print_json};
use impactor::core::context::{ChangeSpec, WorkspaceContext};
use impactor::core::changes::DiffRange;
use impactor::core::error::ImpactResult;
use impactor::graph::{AffectedAnalysis, ProjectRef, analyze};
use serde_json::json;

/// Arguments of the affected command
#[derive(Debug, Clone, Default)]
pub struct AffectedArgs {
  pub since: Option<String>,
  pub from: Option<String>,
  pub to: Option<String>,
  pub files: Vec<String>,
  pub working_tree: bool,
  pub prefix: Option<String>,
  pub format: String,
  pub dry_run: bool,
}

impl AffectedArgs {
  /// Explicit files win, then a from/to pair, then `--since` (or the configured base).
  fn change_spec(&self, ctx: &WorkspaceContext) -> ChangeSpec {
    if !self.files.is_empty() {
      return ChangeSpec::Files(self.files.clone());
    }
    let since = self.since.clone().unwrap_or_else(|| ctx.default_since().to_string());
    let range = match (&self.from, &self.to) {
      (Some(from), Some(to)) => DiffRange::Between {
        from: from.clone(),
        to: to.clone(),
      },
      (Some(from), None) => DiffRange::WorkingTree(from.clone()),
      _ if self.working_tree => DiffRange::WorkingTree(since),
      _ => DiffRange::Since(since),
    };
    ChangeSpec::Git(range)
  }
}

/// Run the affected command
pub fn run_affected(ctx: &WorkspaceContext, args: AffectedArgs) -> ImpactResult<()> {
  let output_format = OutputFormat::from_str(&args.format)?;

  let changed_files = ctx.changed_files(args.change_spec(ctx))?;

  if args.dry_run {
    println!("DRY RUN: Would analyze {} changed files", changed_files.len());
    for file in &changed_files {
      println!("  - {}", file);
    }
    return Ok(());
  }

  let analysis = analyze(&ctx.topology, &changed_files);

  match output_format {
    OutputFormat::Text => display_text(&analysis, args.prefix.as_deref()),
    OutputFormat::Json => display_json(&analysis, args.prefix.as_deref()),
    OutputFormat::NamesOnly => display_names_only(&analysis, args.prefix.as_deref()),
  }
}

fn affected<'g>(analysis: &'g AffectedAnalysis, prefix: Option<&str>) -> Vec<ProjectRef<'g>> {
  let query = analysis.query();
  match prefix {
    Some(prefix) => query.affected_with_prefix(prefix),
    None => query.affected_projects(),
  }
}

/// Display results in human-readable text format
fn display_text(analysis: &AffectedAnalysis, prefix: Option<&str>) -> ImpactResult<()> {
  println!("Affected Analysis");
  println!("=================");
  println!();

  println!("Changed files: {}", analysis.changed_files.len());
  if !analysis.changed_files.is_empty() && analysis.changed_files.len() <= 20 {
    for file in &analysis.changed_files {
      println!("  {}", file);
    }
    println!();
  }

  let projects = affected(analysis, prefix);
  let (direct, dependents): (Vec<&ProjectRef<'_>>, Vec<&ProjectRef<'_>>) =
    projects.iter().partition(|p| p.has_direct_changes());

  println!("Direct impact: {} projects", direct.len());
  for project in &direct {
    println!("  {} ({} files)", display_path(project.path()), project.changed_files().len());
  }
  println!();

  println!("Transitive dependents: {} projects", dependents.len());
  for project in &dependents {
    println!("  {}", display_path(project.path()));
  }
  println!();

  println!("Affected (direct + dependents): {} projects", projects.len());

  let cycles = analysis.graph.find_cycles();
  if !cycles.is_empty() {
    println!();
    println!("Warning: {} dependency cycle(s) detected", cycles.len());
    for cycle in &cycles {
      println!("  {}", cycle.join(" -> "));
    }
  }

  Ok(())
}

/// Display results in JSON format
fn display_json(analysis: &AffectedAnalysis, prefix: Option<&str>) -> ImpactResult<()> {
  let projects = affected(analysis, prefix);
  let direct: Vec<&str> = projects.iter().filter(|p| p.has_direct_changes()).map(|p| p.path()).collect();
  let dependents: Vec<&str> = projects.iter().filter(|p| !p.has_direct_changes()).map(|p| p.path()).collect();
  let affected: Vec<&str> = projects.iter().map(|p| p.path()).collect();

  let ownership: serde_json::Map<String, serde_json::Value> = analysis
    .ownership
    .iter()
    .map(|(path, files)| (path.to_string(), json!(files)))
    .collect();

  let output = json!({
      "changed_files": analysis.changed_files,
      "ownership": ownership,
      "impact": {
          "direct": direct,
          "dependents": dependents,
          "affected": affected
      },
      "summary": analysis.query().summary_with_prefix(prefix.unwrap_or("")),
      "cycles": analysis.graph.find_cycles()
  });

  print_json(&output)
}

/// Display only project names (one per line)
fn display_names_only(analysis: &AffectedAnalysis, prefix: Option<&str>) -> ImpactResult<()> {
  for project in affected(analysis, prefix) {
    println!("{}", project.name());
  }
  Ok(())
}
