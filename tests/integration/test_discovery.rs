//! Integration tests for package discovery

use crate::helpers::{TestWorkspace, sorted_names};
use anyhow::Result;
use monorail::discovery::discover_with;
use monorail::{FileDiscovery, RailResult, WorkspaceGraph, discover};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Returns a fixed file list regardless of patterns
struct FixedFiles(Vec<&'static str>);

impl FileDiscovery for FixedFiles {
  fn find(&self, _patterns: &[String], cwd: &Path) -> RailResult<Vec<PathBuf>> {
    Ok(self.0.iter().map(|f| cwd.join(f)).collect())
  }
}

#[test]
fn test_discover_object_form_with_nested_globs() -> Result<()> {
  let ws = TestWorkspace::with_root(json!({
    "name": "root",
    "version": "0.0.0",
    "workspaces": {"packages": ["packages/*", "tools/**"]},
  }))?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.write_file("tools/lint/config/package.json", r#"{"name": "lint-config", "version": "0.1.0"}"#)?;
  ws.write_file("tools/node_modules/left-pad/package.json", r#"{"name": "left-pad", "version": "1.3.0"}"#)?;

  let packages = discover(&ws.path)?;
  let graph = WorkspaceGraph::from_packages(packages)?;

  assert_eq!(sorted_names(graph.workspaces()), ["core", "lint-config"]);
  let core = graph.get_by_name("core").map(|w| w.directory().to_path_buf());
  assert_eq!(core, Some(ws.path.join("packages").join("core")));

  Ok(())
}

#[test]
fn test_custom_file_discovery() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("kept", "1.0.0", &[])?;
  ws.add_package("hidden", "1.0.0", &[])?;

  let packages = discover_with(&ws.path, &FixedFiles(vec!["packages/kept/package.json"]), "package.json")?;
  assert_eq!(packages.members.len(), 1);
  assert_eq!(packages.members[0].name(), "kept");

  Ok(())
}

#[test]
fn test_malformed_member_aborts_discovery() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("good", "1.0.0", &[])?;
  ws.write_file("packages/broken/package.json", "{ not json")?;

  let err = discover(&ws.path).unwrap_err();
  assert!(err.to_string().contains("parse"), "unexpected error: {}", err);

  Ok(())
}

#[test]
fn test_missing_member_manifest_surfaces_not_found() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let listed = FixedFiles(vec!["packages/ghost/package.json"]);

  let err = discover_with(&ws.path, &listed, "package.json").unwrap_err();
  assert!(err.is_not_found());
  assert!(err.to_string().contains("packages/ghost/package.json"));

  Ok(())
}
