//! Integration tests for graph queries over a discovered monorepo

use crate::helpers::{TestWorkspace, names, sorted_names};
use anyhow::{Context, Result};
use monorail::filters;
use monorail::{DependencyKind, Inclusion, MembersOptions, QueryOptions, RailError, WorkspaceContext};
use serde_json::json;

#[test]
fn test_dependents_follow_range_satisfaction() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("foo", "1.2.3", &[])?;
  ws.add_package("bar", "4.5.6", &[("foo", "^1.0.0")])?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  let foo = ctx.graph.get_by_name("foo").context("foo missing")?;
  assert_eq!(names(ctx.graph.dependents_of(foo, &QueryOptions::default())), ["bar"]);

  // Bumping the requirement past foo's version removes the edge
  ws.add_package("bar", "4.5.6", &[("foo", "^2.0.0")])?;
  let ctx = WorkspaceContext::build(&ws.path)?;
  let foo = ctx.graph.get_by_name("foo").context("foo missing")?;
  assert!(ctx.graph.dependents_of(foo, &QueryOptions::default()).is_empty());

  Ok(())
}

#[test]
fn test_transitive_closures() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("a", "1.0.0", &[("b", "^1.0.0")])?;
  ws.add_package("b", "1.0.0", &[("c", "^1.0.0")])?;
  ws.add_package("c", "1.0.0", &[])?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  let graph = &ctx.graph;
  let a = graph.get_by_name("a").context("a missing")?;
  let c = graph.get_by_name("c").context("c missing")?;

  assert_eq!(names(graph.dependencies_of(a, &QueryOptions::recursive())), ["b", "c"]);
  assert_eq!(names(graph.dependents_of(c, &QueryOptions::recursive())), ["b", "a"]);

  let order = names(graph.topological_order()?);
  let position = |name: &str| order.iter().position(|n| n == name);
  assert!(position("c") < position("b"));
  assert!(position("b") < position("a"));

  Ok(())
}

#[test]
fn test_workspace_protocol_and_scoped_names() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("@acme/core", "2.3.0", &[])?;
  ws.add_package("@acme/ui", "1.0.0", &[("@acme/core", "workspace:^2.0.0")])?;
  ws.add_package("@acme/app", "1.0.0", &[("@acme/ui", "workspace:*"), ("react", "^18.0.0")])?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  let app = ctx.graph.get_by_name("@acme/app").context("app missing")?;

  assert_eq!(
    names(ctx.graph.dependencies_of(app, &QueryOptions::recursive())),
    ["@acme/ui", "@acme/core"]
  );

  Ok(())
}

#[test]
fn test_dev_dependencies_are_a_separate_kind() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("lib", "1.0.0", &[])?;
  ws.add_manifest(
    "tool",
    json!({"name": "tool", "version": "1.0.0", "devDependencies": {"lib": "1.x"}}),
  )?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  let lib = ctx.graph.get_by_name("lib").context("lib missing")?;

  assert_eq!(names(ctx.graph.dependents_of(lib, &QueryOptions::default())), ["tool"]);
  let runtime = QueryOptions::default().with_kinds(&[DependencyKind::Dependencies]);
  assert!(ctx.graph.dependents_of(lib, &runtime).is_empty());

  Ok(())
}

#[test]
fn test_cycle_is_reported_not_followed_forever() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("ping", "1.0.0", &[("pong", "*")])?;
  ws.add_package("pong", "1.0.0", &[("ping", "*")])?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  let ping = ctx.graph.get_by_name("ping").context("ping missing")?;

  assert_eq!(names(ctx.graph.dependencies_of(ping, &QueryOptions::recursive())), ["pong"]);
  assert_eq!(ctx.graph.find_cycles(), vec![vec!["ping".to_string(), "pong".to_string()]]);

  let err = ctx.graph.topological_order().unwrap_err();
  assert!(matches!(err, RailError::Cycle { .. }));
  assert!(err.to_string().contains("ping"));

  Ok(())
}

#[test]
fn test_duplicate_names_fail_build() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_manifest("one", json!({"name": "same", "version": "1.0.0"}))?;
  ws.add_manifest("two", json!({"name": "same", "version": "2.0.0"}))?;

  let err = WorkspaceContext::build(&ws.path).unwrap_err();
  assert!(matches!(err, RailError::DuplicateName { ref name, .. } if name == "same"));

  Ok(())
}

#[test]
fn test_members_with_root_and_filters() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_manifest("public", json!({"name": "public", "version": "1.0.0", "scripts": {"test": "jest"}}))?;
  ws.add_manifest("private", json!({"private": true, "name": "private", "version": "1.0.0"}))?;

  let ctx = WorkspaceContext::build(&ws.path)?;

  let with_root = MembersOptions {
    include_root: true,
    ..ctx.members_options()
  };
  let all = ctx.graph.members(&with_root);
  assert_eq!(sorted_names(all.iter().copied()), ["private", "public", "root"]);

  let public = filters::not(filters::is_private());
  assert_eq!(names(all.iter().copied().filter(|w| public(*w))), ["public"]);

  let testable = filters::script_exists("test");
  assert_eq!(names(ctx.graph.workspaces().filter(|w| testable(*w))), ["public"]);

  Ok(())
}

#[test]
fn test_members_expansion_without_changes() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("a", "1.0.0", &[("b", "^1.0.0")])?;
  ws.add_package("b", "1.0.0", &[])?;

  let ctx = WorkspaceContext::build(&ws.path)?;
  let options = MembersOptions {
    include_dependencies: Inclusion::Recursive,
    include_dependents: Inclusion::Recursive,
    ..Default::default()
  };

  // Expansion only adds what the base set doesn't already have
  assert_eq!(sorted_names(ctx.graph.members(&options)), ["a", "b"]);

  Ok(())
}
