mod commands;

use clap::{Parser, Subcommand};
use commands::AffectedArgs;
use impactor::core::context::WorkspaceContext;
use impactor::core::error::{ImpactError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Find which projects of a monorepo are affected by a set of changes
#[derive(Parser)]
#[command(name = "impactor")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Workspace root (default: current directory)
  #[arg(short = 'C', long, global = true)]
  root: Option<PathBuf>,

  /// Enable debug logging (overrides IMPACTOR_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show which projects are affected by changes
  Affected {
    /// Git ref to compare HEAD against (default: [changes] since, or origin/main)
    #[arg(long)]
    since: Option<String>,
    /// Start ref (for SHA pair mode; alone, diffs against the working tree)
    #[arg(long, conflicts_with = "since")]
    from: Option<String>,
    /// End ref (for SHA pair mode)
    #[arg(long, requires = "from")]
    to: Option<String>,
    /// Compare against the working tree instead of HEAD (includes uncommitted edits)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    working_tree: bool,
    /// Use these changed files instead of asking git
    #[arg(long, num_args = 1.., conflicts_with_all = ["since", "from", "to", "working_tree"])]
    files: Vec<String>,
    /// Only report affected projects whose path starts with this prefix
    #[arg(long)]
    prefix: Option<String>,
    /// Output format: text (default), json, names-only
    #[arg(long, default_value = "text")]
    format: String,
    /// List the changed files without analyzing them
    #[arg(long)]
    dry_run: bool,
  },

  /// Show every project that depends on the given one, directly or transitively
  Dependents {
    /// Project name or fully qualified path
    project: String,
    /// Output format: text (default), json, names-only
    #[arg(long, default_value = "text")]
    format: String,
  },

  /// List the projects and dependency edges of the workspace
  Projects {
    /// Output format: text (default), json, names-only
    #[arg(long, default_value = "text")]
    format: String,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("impactor=debug")
  } else {
    EnvFilter::try_from_env("IMPACTOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let workspace_root = match cli.root {
    Some(root) => root,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => {
        eprintln!("Error: Failed to get current directory: {}", e);
        std::process::exit(1);
      }
    },
  };

  // Build workspace context once (config + topology)
  let ctx = match WorkspaceContext::build(&workspace_root) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Affected {
      since,
      from,
      to,
      working_tree,
      files,
      prefix,
      format,
      dry_run,
    } => commands::run_affected(
      &ctx,
      AffectedArgs {
        since,
        from,
        to,
        files,
        working_tree,
        prefix,
        format,
        dry_run,
      },
    ),
    Commands::Dependents { project, format } => commands::run_dependents(&ctx, project, format),
    Commands::Projects { format } => commands::run_projects(&ctx, format),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ImpactError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
