//! Integration tests for `impactor projects`

use crate::helpers::{TestWorkspace, run_impactor, stdout_json, stdout_lines};
use anyhow::Result;

#[test]
fn test_projects_lists_cargo_members() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", &[])?;
  ws.add_crate("lib-b", &["lib-a"])?;
  ws.commit("Add crates")?;

  let output = run_impactor(&ws.path, &["projects", "--format", "names"])?;
  let mut names = stdout_lines(&output);
  names.sort();
  assert_eq!(names, vec!["lib-a", "lib-b"]);

  let output = run_impactor(&ws.path, &["projects", "--format", "json"])?;
  let json = stdout_json(&output)?;
  let projects = json["projects"].as_array().cloned().unwrap_or_default();
  let lib_b = projects
    .iter()
    .find(|p| p["name"] == "lib-b")
    .expect("lib-b should be listed");

  assert_eq!(lib_b["path"], ":crates:lib-b");
  assert_eq!(lib_b["dir"], "crates/lib-b");
  assert_eq!(lib_b["dependencies"], serde_json::json!([":crates:lib-a"]));

  Ok(())
}

#[test]
fn test_projects_root_flag() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("only", &[])?;
  ws.commit("Add crate")?;

  let cwd = std::env::temp_dir();
  let root = ws.path.to_string_lossy().to_string();
  let output = run_impactor(&cwd, &["-C", &root, "projects"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Projects: 1"), "got: {}", stdout);
  assert!(stdout.contains(":crates:only [only] (crates/only)"), "got: {}", stdout);

  Ok(())
}
