//! Changed package detection
//!
//! Given a set of changed files, determine which packages contain them and,
//! through [`WorkspaceGraph::members`], which packages depend on them.

use super::workspace_graph::{MembersOptions, Workspace, WorkspaceGraph};
use crate::core::error::RailResult;
use crate::core::vcs::{ChangeSet, ChangeSetProvider, DiffRequest};
use crate::utils::is_within;
use tracing::debug;

/// Does any changed file live inside `workspace`'s directory?
///
/// Containment is by whole path components. Files are compared as given, so
/// the change set and the graph must agree on relative vs. absolute paths.
pub fn is_changed(workspace: &Workspace, change_set: &ChangeSet) -> bool {
  change_set.keys().any(|file| is_within(file, workspace.directory()))
}

/// Ask `provider` for changed files once, then select members with them.
///
/// `options.changed` is replaced by the provider's change set; every other
/// option is honored as given.
pub fn changed_members<'g>(
  graph: &'g WorkspaceGraph,
  provider: &dyn ChangeSetProvider,
  request: &DiffRequest,
  options: &MembersOptions<'_>,
) -> RailResult<Vec<&'g Workspace>> {
  let change_set = provider.changed_files(request)?;
  debug!(files = change_set.len(), since = ?request.since, "collected change set");

  let options = MembersOptions {
    changed: Some(&change_set),
    ..options.clone()
  };
  Ok(graph.members(&options))
}
