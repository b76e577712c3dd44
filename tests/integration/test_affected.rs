//! Integration tests for `impactor affected` on a cargo workspace

use crate::helpers::{TestWorkspace, run_impactor, run_impactor_raw, stdout_json, stdout_lines};
use anyhow::Result;

/// lib-a <- lib-b <- lib-c, plus an unrelated lib-d
fn chain_workspace() -> Result<TestWorkspace> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", &[])?;
  ws.add_crate("lib-b", &["lib-a"])?;
  ws.add_crate("lib-c", &["lib-b"])?;
  ws.add_crate("lib-d", &[])?;
  ws.commit("Add crates")?;
  ws.mark_base()?;
  Ok(ws)
}

#[test]
fn test_affected_basic() -> Result<()> {
  let ws = chain_workspace()?;
  ws.modify_file("lib-a", "src/lib.rs", "pub fn hello() -> &'static str { \"Modified\" }\n")?;
  ws.commit("Modify lib-a")?;

  let output = run_impactor(&ws.path, &["affected", "--since", "origin/main"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Changed files: 1"), "got: {}", stdout);
  assert!(stdout.contains("Direct impact: 1 projects"), "got: {}", stdout);
  assert!(stdout.contains(":crates:lib-a (1 files)"), "got: {}", stdout);
  assert!(stdout.contains("Transitive dependents: 2 projects"), "got: {}", stdout);
  assert!(stdout.contains("Affected (direct + dependents): 3 projects"), "got: {}", stdout);
  assert!(!stdout.contains("lib-d"), "lib-d is unrelated, got: {}", stdout);

  Ok(())
}

#[test]
fn test_affected_no_changes() -> Result<()> {
  let ws = chain_workspace()?;

  let output = run_impactor(&ws.path, &["affected", "--since", "origin/main"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Changed files: 0"), "got: {}", stdout);
  assert!(stdout.contains("Affected (direct + dependents): 0 projects"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_affected_defaults_to_origin_main() -> Result<()> {
  let ws = chain_workspace()?;
  ws.modify_file("lib-c", "README.md", "# changed\n")?;
  ws.commit("Touch lib-c")?;

  let output = run_impactor(&ws.path, &["affected", "--format", "names-only"])?;
  assert_eq!(stdout_lines(&output), vec!["lib-c"]);

  Ok(())
}

#[test]
fn test_affected_json_output() -> Result<()> {
  let ws = chain_workspace()?;
  ws.modify_file("lib-b", "README.md", "# Modified\n")?;
  ws.commit("Modify lib-b README")?;

  let output = run_impactor(&ws.path, &["affected", "--since", "origin/main", "--format", "json"])?;
  let json = stdout_json(&output)?;

  assert_eq!(json["changed_files"], serde_json::json!(["crates/lib-b/README.md"]));
  assert_eq!(json["impact"]["direct"], serde_json::json!([":crates:lib-b"]));
  assert_eq!(json["impact"]["dependents"], serde_json::json!([":crates:lib-c"]));
  assert_eq!(
    json["ownership"][":crates:lib-b"],
    serde_json::json!(["crates/lib-b/README.md"])
  );
  assert_eq!(json["summary"]["total_projects"], 4);
  assert_eq!(json["summary"]["directly_changed_count"], 1);
  assert_eq!(json["summary"]["affected_count"], 2);
  assert_eq!(json["cycles"], serde_json::json!([]));

  Ok(())
}

#[test]
fn test_affected_names_only() -> Result<()> {
  let ws = chain_workspace()?;
  ws.modify_file("lib-a", "src/lib.rs", "pub fn hello() -> &'static str { \"Changed\" }\n")?;
  ws.commit("Change lib-a")?;

  let output = run_impactor(&ws.path, &["affected", "--since", "origin/main", "--format", "names"])?;
  let mut lines = stdout_lines(&output);
  lines.sort();

  assert_eq!(lines, vec!["lib-a", "lib-b", "lib-c"]);

  Ok(())
}

#[test]
fn test_affected_sha_pair_mode() -> Result<()> {
  let ws = chain_workspace()?;

  ws.modify_file("lib-d", "README.md", "# Updated\n")?;
  let sha1 = ws.commit("Update lib-d")?;
  ws.modify_file("lib-b", "README.md", "# Updated\n")?;
  let sha2 = ws.commit("Update lib-b")?;

  // Only the second commit is in range
  let output = run_impactor(&ws.path, &["affected", "--from", &sha1, "--to", &sha2, "--format", "names"])?;
  let mut lines = stdout_lines(&output);
  lines.sort();

  assert_eq!(lines, vec!["lib-b", "lib-c"]);

  Ok(())
}

#[test]
fn test_affected_working_tree_includes_uncommitted_edits() -> Result<()> {
  let ws = chain_workspace()?;
  ws.modify_file("lib-d", "src/lib.rs", "pub fn hello() -> &'static str { \"dirty\" }\n")?;

  let committed = run_impactor(&ws.path, &["affected", "--format", "names"])?;
  assert!(stdout_lines(&committed).is_empty());

  let dirty = run_impactor(&ws.path, &["affected", "--working-tree", "--format", "names"])?;
  assert_eq!(stdout_lines(&dirty), vec!["lib-d"]);

  Ok(())
}

#[test]
fn test_affected_root_files_in_virtual_workspace_are_unowned() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("rustfmt.toml", "max_width = 100\n")?;
  ws.commit("Add rustfmt config")?;

  let output = run_impactor(&ws.path, &["affected", "--format", "json"])?;
  let json = stdout_json(&output)?;

  assert_eq!(json["changed_files"], serde_json::json!(["rustfmt.toml"]));
  assert_eq!(json["impact"]["affected"], serde_json::json!([]));

  Ok(())
}

#[test]
fn test_affected_explicit_files_skip_git() -> Result<()> {
  let ws = chain_workspace()?;

  let output = run_impactor(
    &ws.path,
    &["affected", "--files", "crates/lib-b/src/lib.rs", "./crates/lib-d/README.md", "--format", "names"],
  )?;
  let mut lines = stdout_lines(&output);
  lines.sort();

  assert_eq!(lines, vec!["lib-b", "lib-c", "lib-d"]);

  Ok(())
}

#[test]
fn test_affected_prefix_filter() -> Result<()> {
  let ws = chain_workspace()?;

  let output = run_impactor(
    &ws.path,
    &[
      "affected",
      "--files",
      "crates/lib-a/src/lib.rs",
      "--prefix",
      ":crates:lib-c",
      "--format",
      "names",
    ],
  )?;

  assert_eq!(stdout_lines(&output), vec!["lib-c"]);

  Ok(())
}

#[test]
fn test_affected_prefix_scopes_json_summary() -> Result<()> {
  let ws = chain_workspace()?;

  let output = run_impactor(
    &ws.path,
    &[
      "affected",
      "--files",
      "crates/lib-a/src/lib.rs",
      "--prefix",
      ":crates:lib-c",
      "--format",
      "json",
    ],
  )?;
  let json = stdout_json(&output)?;

  assert_eq!(json["impact"]["affected"], serde_json::json!([":crates:lib-c"]));
  assert_eq!(json["summary"]["affected_paths"], json["impact"]["affected"]);
  assert_eq!(json["summary"]["affected_count"], 1);
  assert_eq!(json["summary"]["directly_changed_count"], 0);
  assert_eq!(json["summary"]["total_projects"], 1);

  Ok(())
}

#[test]
fn test_affected_dry_run_lists_files() -> Result<()> {
  let ws = chain_workspace()?;
  ws.modify_file("lib-a", "README.md", "# a\n")?;
  ws.commit("Touch lib-a")?;

  let output = run_impactor(&ws.path, &["affected", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("DRY RUN: Would analyze 1 changed files"), "got: {}", stdout);
  assert!(stdout.contains("crates/lib-a/README.md"), "got: {}", stdout);
  assert!(!stdout.contains("Affected Analysis"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_affected_unknown_ref_is_system_error() -> Result<()> {
  let ws = chain_workspace()?;

  let output = run_impactor_raw(&ws.path, &["affected", "--since", "no-such-ref"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));

  Ok(())
}

#[test]
fn test_affected_unknown_format_is_user_error() -> Result<()> {
  let ws = chain_workspace()?;

  let output = run_impactor_raw(&ws.path, &["affected", "--format", "yaml"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown format 'yaml'"));

  Ok(())
}
