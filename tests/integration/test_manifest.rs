//! Integration tests for workspaces described by `impact.toml`

use crate::helpers::{TestWorkspace, run_impactor, run_impactor_raw, stdout_json, stdout_lines};
use anyhow::Result;

const MANIFEST: &str = r#"
[workspace]
provider = "manifest"

[changes]
exclude = ["*.md", "docs/**"]

[[projects]]
name = "root"
path = ""

[[projects]]
name = "core"
path = ":libs:core"

[[projects]]
name = "app"
path = ":app"
dependencies = [":libs:core"]

[[projects]]
name = "tools"
path = ":tools"
dir = "build-tools"
"#;

fn manifest_workspace() -> Result<TestWorkspace> {
  let ws = TestWorkspace::bare()?;
  ws.write_file("impact.toml", MANIFEST)?;
  ws.write_file("settings.gradle.kts", "include(\":app\")\n")?;
  ws.write_file("libs/core/src/Core.kt", "object Core\n")?;
  ws.write_file("app/src/Main.kt", "fun main() {}\n")?;
  ws.write_file("build-tools/run.sh", "#!/bin/sh\n")?;
  ws.commit("Initial")?;
  ws.mark_base()?;
  Ok(ws)
}

#[test]
fn test_root_owns_only_unclaimed_files() -> Result<()> {
  let ws = manifest_workspace()?;

  let output = run_impactor(
    &ws.path,
    &["affected", "--files", "settings.gradle.kts", "app/src/Main.kt", "--format", "json"],
  )?;
  let json = stdout_json(&output)?;

  assert_eq!(json["ownership"][""], serde_json::json!(["settings.gradle.kts"]));
  assert_eq!(json["ownership"][":app"], serde_json::json!(["app/src/Main.kt"]));
  assert_eq!(json["impact"]["direct"], serde_json::json!(["", ":app"]));
  assert_eq!(json["impact"]["dependents"], serde_json::json!([]));

  Ok(())
}

#[test]
fn test_library_change_reaches_dependents() -> Result<()> {
  let ws = manifest_workspace()?;
  ws.write_file("libs/core/src/Core.kt", "object Core { val x = 1 }\n")?;
  ws.commit("Change core")?;

  let output = run_impactor(&ws.path, &["affected", "--format", "names"])?;

  // Declaration order of the manifest
  assert_eq!(stdout_lines(&output), vec!["core", "app"]);

  Ok(())
}

#[test]
fn test_explicit_dir_overrides_path() -> Result<()> {
  let ws = manifest_workspace()?;

  let output = run_impactor(&ws.path, &["affected", "--files", "build-tools/run.sh", "--format", "names"])?;
  assert_eq!(stdout_lines(&output), vec!["tools"]);

  let output = run_impactor(&ws.path, &["affected", "--files", "tools/run.sh", "--format", "names"])?;
  assert_eq!(stdout_lines(&output), vec!["root"]);

  Ok(())
}

#[test]
fn test_excluded_files_are_ignored() -> Result<()> {
  let ws = manifest_workspace()?;
  ws.write_file("app/README.md", "# app\n")?;
  ws.write_file("docs/guide.txt", "guide\n")?;
  ws.commit("Docs only")?;

  let output = run_impactor(&ws.path, &["affected", "--format", "json"])?;
  let json = stdout_json(&output)?;

  assert_eq!(json["changed_files"], serde_json::json!([]));
  assert_eq!(json["impact"]["affected"], serde_json::json!([]));

  Ok(())
}

#[test]
fn test_configured_base_ref() -> Result<()> {
  let ws = manifest_workspace()?;
  ws.write_file("impact.toml", &MANIFEST.replace("[changes]", "[changes]\nsince = \"release\""))?;
  ws.commit("Use release as base")?;
  crate::helpers::git(&ws.path, &["branch", "release"])?;
  ws.write_file("app/src/Main.kt", "fun main() { println() }\n")?;
  ws.commit("Change app")?;

  let output = run_impactor(&ws.path, &["affected", "--format", "names"])?;
  assert_eq!(stdout_lines(&output), vec!["app"]);

  Ok(())
}

#[test]
fn test_root_with_dependencies_is_affected_only_by_its_own_files() -> Result<()> {
  let ws = TestWorkspace::bare()?;
  ws.write_file(
    "impact.toml",
    r#"
[workspace]
provider = "manifest"

[[projects]]
name = "root"
path = ""
dependencies = [":lib"]

[[projects]]
name = "lib"
path = ":lib"
"#,
  )?;

  let output = run_impactor(&ws.path, &["affected", "--files", "lib/src/Lib.kt", "--format", "names"])?;
  assert_eq!(stdout_lines(&output), vec!["lib"]);

  let output = run_impactor(
    &ws.path,
    &["affected", "--files", "lib/src/Lib.kt", "build.gradle.kts", "--format", "names"],
  )?;
  assert_eq!(stdout_lines(&output), vec!["root", "lib"]);

  Ok(())
}

#[test]
fn test_duplicate_project_paths_are_rejected() -> Result<()> {
  let ws = TestWorkspace::bare()?;
  ws.write_file(
    "impact.toml",
    "[workspace]\nprovider = \"manifest\"\n\n[[projects]]\nname = \"a\"\npath = \":a\"\n\n[[projects]]\nname = \"b\"\npath = \":a\"\n",
  )?;

  let output = run_impactor_raw(&ws.path, &["projects"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains(":a"));

  Ok(())
}

#[test]
fn test_invalid_config_is_user_error() -> Result<()> {
  let ws = TestWorkspace::bare()?;
  ws.write_file("impact.toml", "[workspace]\nprovider = \"bazel\"\n")?;

  let output = run_impactor_raw(&ws.path, &["projects"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));

  Ok(())
}
