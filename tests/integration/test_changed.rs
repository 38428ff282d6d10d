//! Integration tests for change detection against real git history

use crate::helpers::{TestWorkspace, git, names, sorted_names};
use anyhow::Result;
use monorail::{ChangeSetProvider, DiffRequest, Inclusion, MembersOptions, SystemGit, WorkspaceContext};

fn chain() -> Result<TestWorkspace> {
  let ws = TestWorkspace::new()?;
  ws.add_package("lib-a", "0.1.0", &[])?;
  ws.add_package("lib-b", "0.1.0", &[("lib-a", "^0.1.0")])?;
  ws.add_package("app", "1.0.0", &[("lib-b", "~0.1.0")])?;
  ws.commit("Add lib-a, lib-b and app")?;
  Ok(ws)
}

#[test]
fn test_changed_since_with_dependents() -> Result<()> {
  let ws = chain()?;
  git(&ws.path, &["branch", "baseline"])?;

  ws.modify_file("lib-a", "index.js", "module.exports = { modified: true };\n")?;
  ws.commit("Modify lib-a")?;

  let ctx = WorkspaceContext::build(&ws.path)?;

  let direct = ctx.changed(Some("baseline"), &MembersOptions::default())?;
  assert_eq!(names(direct), ["lib-a"]);

  let options = MembersOptions {
    include_dependents: Inclusion::Recursive,
    ..ctx.members_options()
  };
  let affected = ctx.changed(Some("baseline"), &options)?;
  assert_eq!(names(affected), ["lib-a", "lib-b", "app"]);

  let options = MembersOptions {
    include_dependents: Inclusion::Direct,
    ..ctx.members_options()
  };
  assert_eq!(names(ctx.changed(Some("baseline"), &options)?), ["lib-a", "lib-b"]);

  Ok(())
}

#[test]
fn test_no_changes() -> Result<()> {
  let ws = chain()?;
  git(&ws.path, &["branch", "baseline"])?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  assert!(ctx.changed(Some("baseline"), &MembersOptions::default())?.is_empty());

  Ok(())
}

#[test]
fn test_root_files_do_not_select_members() -> Result<()> {
  let ws = chain()?;
  git(&ws.path, &["branch", "baseline"])?;

  ws.write_file("README.md", "# monorepo\n")?;
  ws.commit("Add readme")?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  assert!(ctx.changed(Some("baseline"), &MembersOptions::default())?.is_empty());

  let with_root = MembersOptions {
    include_root: true,
    ..Default::default()
  };
  assert_eq!(names(ctx.changed(Some("baseline"), &with_root)?), ["root"]);

  Ok(())
}

#[test]
fn test_unstaged_changes_without_since() -> Result<()> {
  let ws = chain()?;
  ws.modify_file("lib-b", "index.js", "module.exports = 2;\n")?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  assert_eq!(names(ctx.changed(None, &MembersOptions::default())?), ["lib-b"]);

  Ok(())
}

#[test]
fn test_configured_base_with_merge_base() -> Result<()> {
  let ws = chain()?;
  ws.write_file("monorail.toml", "[changes]\nbase = \"main\"\nmerge_base = true\n")?;
  ws.commit("Add monorail config")?;

  git(&ws.path, &["checkout", "-b", "feature"])?;
  ws.modify_file("app", "index.js", "module.exports = 'feature';\n")?;
  ws.commit("Work on app")?;

  // main moves on independently; merge-base keeps its changes out of the diff
  git(&ws.path, &["checkout", "main"])?;
  ws.modify_file("lib-a", "index.js", "module.exports = 'main';\n")?;
  ws.commit("Work on lib-a")?;
  git(&ws.path, &["checkout", "feature"])?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  assert_eq!(names(ctx.changed(None, &MembersOptions::default())?), ["app"]);

  Ok(())
}

#[test]
fn test_system_git_diff_paths_are_cwd_joined() -> Result<()> {
  let ws = chain()?;
  let output = git(&ws.path, &["rev-parse", "HEAD"])?;
  let base = String::from_utf8_lossy(&output.stdout).trim().to_string();

  ws.modify_file("lib-a", "index.js", "module.exports = 3;\n")?;
  ws.write_file("packages/lib-a/new file.js", "module.exports = 4;\n")?;
  ws.commit("Change lib-a")?;

  let system_git = SystemGit::open(&ws.path)?;
  let package_dir = ws.path.join("packages").join("lib-a");
  let request = DiffRequest {
    cwd: Some(package_dir.clone()),
    since: Some(base),
    files: Vec::new(),
  };
  let changes = system_git.changed_files(&request)?;

  assert_eq!(changes.len(), 2);
  assert_eq!(changes.get(&package_dir.join("index.js")).map(String::as_str), Some("M"));
  assert_eq!(changes.get(&package_dir.join("new file.js")).map(String::as_str), Some("A"));

  Ok(())
}

#[test]
fn test_moved_file_changes_source_and_destination() -> Result<()> {
  let ws = chain()?;
  let body = "export function helper(a, b) {\n  return a + b;\n}\n".repeat(8);
  ws.modify_file("lib-a", "helper.js", &body)?;
  ws.commit("Add helper to lib-a")?;
  git(&ws.path, &["branch", "baseline"])?;

  git(&ws.path, &["mv", "packages/lib-a/helper.js", "packages/app/helper.js"])?;
  ws.commit("Move helper to app")?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  let changed = ctx.changed(Some("baseline"), &MembersOptions::default())?;
  assert_eq!(sorted_names(changed), ["app", "lib-a"]);

  Ok(())
}
