//! Unified workspace context - build once, pass everywhere
//!
//! # Architecture
//!
//! ```text
//! WorkspaceContext::build(root)
//!   |- MonorailConfig::load        (monorail.toml, optional)
//!   |- discovery::discover_with    (root manifest + workspace globs)
//!   '- WorkspaceGraph::from_packages
//!   |
//!   v
//! callers: ctx.graph.dependents_of(..), ctx.changed(..), ...
//! ```
//!
//! The graph is immutable, so it is shared through `Arc` and cloning the
//! context is cheap.

use crate::core::config::MonorailConfig;
use crate::core::error::{RailResult, ResultExt};
use crate::core::vcs::{DiffRequest, SystemGit};
use crate::discovery::{self, GlobDiscovery};
use crate::graph::{MembersOptions, QueryOptions, Workspace, WorkspaceGraph, changed_members};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Shared monorepo state: root, config and the resolved graph.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
  /// Monorepo root directory (canonical path)
  pub root: PathBuf,

  /// Monorail configuration (defaults when no monorail.toml exists)
  pub config: Arc<MonorailConfig>,

  /// Dependency graph, built once
  pub graph: Arc<WorkspaceGraph>,
}

impl WorkspaceContext {
  /// Build the context for the monorepo rooted at `workspace_root`.
  ///
  /// Fails on an invalid config, on any manifest that fails to load, or on
  /// duplicate package names.
  pub fn build(workspace_root: &Path) -> RailResult<Self> {
    let root = workspace_root
      .canonicalize()
      .with_context(|| format!("Failed to resolve workspace root {}", workspace_root.display()))?;
    let config = MonorailConfig::load(&root)?;

    let file_discovery = GlobDiscovery::with_ignore(&config.discovery.ignore)?;
    let packages = discovery::discover_with(&root, &file_discovery, &config.discovery.manifest)?;
    let graph = WorkspaceGraph::from_packages(packages)?;

    debug!(root = %root.display(), members = graph.workspaces().count(), "workspace context ready");

    Ok(Self {
      root,
      config: Arc::new(config),
      graph: Arc::new(graph),
    })
  }

  /// Query options using the configured dependency kinds
  pub fn query_options(&self, recursive: bool) -> QueryOptions {
    QueryOptions {
      kinds: self.config.graph.kinds.clone(),
      recursive,
    }
  }

  /// Members options using the configured dependency kinds
  pub fn members_options(&self) -> MembersOptions<'static> {
    MembersOptions {
      kinds: self.config.graph.kinds.clone(),
      ..Default::default()
    }
  }

  /// Build the diff request for `since`, falling back to `[changes].base`.
  ///
  /// With `[changes].merge_base`, the resolved commit is replaced by
  /// `git merge-base <since> HEAD`.
  pub fn diff_request(&self, git: &SystemGit, since: Option<&str>) -> RailResult<DiffRequest> {
    let since = since.map(str::to_string).or_else(|| self.config.changes.base.clone());
    let since = match since {
      Some(since) if self.config.changes.merge_base => Some(git.merge_base(&since, "HEAD")?),
      other => other,
    };

    Ok(DiffRequest {
      cwd: Some(self.root.clone()),
      since,
      files: Vec::new(),
    })
  }

  /// Packages changed since `since` (see [`Self::diff_request`]), expanded per `options`.
  pub fn changed(&self, since: Option<&str>, options: &MembersOptions<'_>) -> RailResult<Vec<&Workspace>> {
    let git = SystemGit::open(&self.root)?;
    let request = self.diff_request(&git, since)?;
    changed_members(&self.graph, &git, &request, options)
  }
}
