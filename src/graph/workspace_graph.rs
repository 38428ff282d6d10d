//! Workspace dependency graph with semver-gated edges
//!
//! ## Graph Structure
//!
//! - **Nodes**: one [`Workspace`] per package (root first, then members)
//! - **Edges**: `A → B` when A declares a range on B's name that B's version
//!   satisfies (all dependency kinds, merged); weight is the declared range
//! - **Index**: package name → node index, built once
//!
//! Construction is two-phase: nodes are added from immutable manifests, then
//! the name index exists and edges are resolved against it. Nodes hold no
//! back-reference to the graph; every query borrows the graph instead.
//!
//! Closure queries (`dependencies_of`, `dependents_of`) re-evaluate ranges
//! against the requested dependency kinds rather than reading the stored
//! edges, because narrowing the kinds can change which range wins for a name.

use super::changed::is_changed;
use super::range;
use crate::core::error::{RailError, RailResult};
use crate::core::vcs::ChangeSet;
use crate::discovery::Packages;
use crate::manifest::{DependencyKind, Manifest};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A package node: a manifest plus the directory it lives in.
#[derive(Debug, Clone)]
pub struct Workspace {
  manifest: Manifest,
  directory: PathBuf,
}

impl Workspace {
  pub fn new(manifest: Manifest) -> Self {
    let directory = manifest
      .source_path()
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_default();
    Self { manifest, directory }
  }

  pub fn name(&self) -> &str {
    self.manifest.name()
  }

  pub fn version(&self) -> &str {
    self.manifest.version()
  }

  /// Directory containing the package's manifest
  pub fn directory(&self) -> &Path {
    &self.directory
  }

  pub fn manifest(&self) -> &Manifest {
    &self.manifest
  }

  pub fn is_private(&self) -> bool {
    self.manifest.is_private()
  }

  /// True when the script exists with a non-empty command
  pub fn has_script(&self, name: &str) -> bool {
    self.manifest.script(name).is_some_and(|cmd| !cmd.is_empty())
  }
}

/// Options for [`WorkspaceGraph::dependencies_of`] / [`WorkspaceGraph::dependents_of`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
  /// Dependency tables to follow (default: all, in precedence order)
  pub kinds: Vec<DependencyKind>,
  /// Follow edges transitively
  pub recursive: bool,
}

impl Default for QueryOptions {
  fn default() -> Self {
    Self {
      kinds: DependencyKind::ALL.to_vec(),
      recursive: false,
    }
  }
}

impl QueryOptions {
  /// All kinds, transitive
  pub fn recursive() -> Self {
    Self {
      recursive: true,
      ..Self::default()
    }
  }

  pub fn with_kinds(mut self, kinds: &[DependencyKind]) -> Self {
    self.kinds = kinds.to_vec();
    self
  }
}

/// How far to expand a selection along one direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Inclusion {
  #[default]
  None,
  /// Direct neighbours only
  Direct,
  /// Full transitive closure
  Recursive,
}

/// Options for [`WorkspaceGraph::members`]
#[derive(Debug, Clone)]
pub struct MembersOptions<'a> {
  /// Append the root package to the base set
  pub include_root: bool,
  /// Keep only packages containing a changed file
  pub changed: Option<&'a ChangeSet>,
  pub include_dependencies: Inclusion,
  pub include_dependents: Inclusion,
  /// Dependency tables used for the expansions
  pub kinds: Vec<DependencyKind>,
}

impl Default for MembersOptions<'_> {
  fn default() -> Self {
    Self {
      include_root: false,
      changed: None,
      include_dependencies: Inclusion::None,
      include_dependents: Inclusion::None,
      kinds: DependencyKind::ALL.to_vec(),
    }
  }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
  Dependencies,
  Dependents,
}

/// Workspace dependency graph.
///
/// Immutable after construction; safe to share across threads.
#[derive(Debug)]
pub struct WorkspaceGraph {
  /// Nodes: Workspace. Edges: declared range (satisfied, all kinds merged)
  graph: DiGraph<Workspace, String>,

  root: NodeIndex,

  /// Member nodes in discovery order (root excluded)
  members: Vec<NodeIndex>,

  /// Index: package name → node index
  name_to_node: HashMap<String, NodeIndex>,
}

impl WorkspaceGraph {
  /// Build the graph from a root manifest and its members.
  ///
  /// # Errors
  /// `DuplicateName` when two packages (root included) share a name.
  pub fn new(root: Manifest, members: Vec<Manifest>) -> RailResult<Self> {
    let mut graph = DiGraph::new();
    let mut name_to_node: HashMap<String, NodeIndex> = HashMap::new();

    // Phase 1: nodes + index
    let mut add = |graph: &mut DiGraph<Workspace, String>, manifest: Manifest| -> RailResult<NodeIndex> {
      if let Some(existing) = name_to_node.get(manifest.name()) {
        let first: &Workspace = &graph[*existing];
        return Err(RailError::DuplicateName {
          name: manifest.name().to_string(),
          first: first.manifest().source_path().to_path_buf(),
          second: manifest.source_path().to_path_buf(),
        });
      }
      let name = manifest.name().to_string();
      let idx = graph.add_node(Workspace::new(manifest));
      name_to_node.insert(name, idx);
      Ok(idx)
    };

    let root = add(&mut graph, root)?;
    let members = members
      .into_iter()
      .map(|manifest| add(&mut graph, manifest))
      .collect::<RailResult<Vec<_>>>()?;

    // Phase 2: satisfied edges
    let mut edges = Vec::new();
    for from in graph.node_indices() {
      for (name, range) in graph[from].manifest().dependencies(&DependencyKind::ALL) {
        if let Some(&to) = name_to_node.get(&name)
          && to != from
          && range::satisfies(graph[to].version(), &range)
        {
          edges.push((from, to, range));
        }
      }
    }
    for (from, to, range) in edges {
      graph.add_edge(from, to, range);
    }

    debug!(
      nodes = graph.node_count(),
      edges = graph.edge_count(),
      "built workspace graph"
    );

    Ok(Self {
      graph,
      root,
      members,
      name_to_node,
    })
  }

  /// Build the graph from discovered packages
  pub fn from_packages(packages: Packages) -> RailResult<Self> {
    Self::new(packages.root, packages.members)
  }

  /// The root package
  pub fn root(&self) -> &Workspace {
    &self.graph[self.root]
  }

  /// Member packages (root excluded), in discovery order
  pub fn workspaces(&self) -> impl Iterator<Item = &Workspace> {
    self.members.iter().map(|idx| &self.graph[*idx])
  }

  /// Root followed by every member
  pub fn iter(&self) -> impl Iterator<Item = &Workspace> {
    std::iter::once(self.root).chain(self.members.iter().copied()).map(|idx| &self.graph[idx])
  }

  /// Look up a package by name. O(1).
  pub fn get_by_name(&self, name: &str) -> Option<&Workspace> {
    self.name_to_node.get(name).map(|idx| &self.graph[*idx])
  }

  /// Packages `workspace` depends on, through ranges its targets satisfy.
  ///
  /// Order is first discovery: declaration order, depth-first when recursive.
  /// Unknown names and unsatisfied ranges are skipped silently. The queried
  /// package is never part of its own result, even on a cycle.
  pub fn dependencies_of(&self, workspace: &Workspace, options: &QueryOptions) -> Vec<&Workspace> {
    self.closure_of(workspace, options, Direction::Dependencies)
  }

  /// Packages (root included) that depend on `workspace` through a range its
  /// version satisfies. Self-dependencies are ignored.
  ///
  /// Scans every node per step: O(N) direct, O(N·depth) recursive. Monorepos
  /// are small enough that a reverse index isn't worth keeping in sync.
  pub fn dependents_of(&self, workspace: &Workspace, options: &QueryOptions) -> Vec<&Workspace> {
    self.closure_of(workspace, options, Direction::Dependents)
  }

  /// Select packages: members (optionally + root), optionally narrowed to
  /// changed packages, then widened with dependency/dependent closures.
  ///
  /// Result is de-duplicated in first-insertion order.
  pub fn members(&self, options: &MembersOptions<'_>) -> Vec<&Workspace> {
    let mut base = self.members.clone();
    if options.include_root {
      base.push(self.root);
    }
    if let Some(changed) = options.changed {
      base.retain(|idx| is_changed(&self.graph[*idx], changed));
    }

    let mut seen = HashSet::new();
    let mut combined = Vec::new();
    for idx in &base {
      if seen.insert(*idx) {
        combined.push(*idx);
      }
    }

    let expansions = [
      (options.include_dependencies, Direction::Dependencies),
      (options.include_dependents, Direction::Dependents),
    ];
    for (inclusion, direction) in expansions {
      if inclusion == Inclusion::None {
        continue;
      }
      let query = QueryOptions {
        kinds: options.kinds.clone(),
        recursive: inclusion == Inclusion::Recursive,
      };
      for idx in &base {
        for found in self.closure(*idx, &query, direction) {
          if seen.insert(found) {
            combined.push(found);
          }
        }
      }
    }

    combined.into_iter().map(|idx| &self.graph[idx]).collect()
  }

  /// Groups of packages that depend on each other in a cycle.
  ///
  /// Uses Tarjan's SCC over satisfied edges; single-node components are not cycles.
  pub fn find_cycles(&self) -> Vec<Vec<String>> {
    algo::tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| component.len() > 1)
      .map(|component| {
        let mut names: Vec<String> = component.into_iter().map(|idx| self.graph[idx].name().to_string()).collect();
        names.sort();
        names
      })
      .collect()
  }

  /// All packages with dependencies before their dependents.
  ///
  /// # Errors
  /// `Cycle` if the satisfied edges contain a cycle.
  pub fn topological_order(&self) -> RailResult<Vec<&Workspace>> {
    let order = algo::toposort(&self.graph, None).map_err(|cycle| {
      let name = self.graph[cycle.node_id()].name().to_string();
      let members = self
        .find_cycles()
        .into_iter()
        .find(|members| members.contains(&name))
        .unwrap_or_else(|| vec![name]);
      RailError::Cycle { members }
    })?;

    // toposort puts dependents first (edges point at dependencies)
    Ok(order.into_iter().rev().map(|idx| &self.graph[idx]).collect())
  }

  fn index_of(&self, workspace: &Workspace) -> Option<NodeIndex> {
    self.name_to_node.get(workspace.name()).copied()
  }

  fn closure_of(&self, workspace: &Workspace, options: &QueryOptions, direction: Direction) -> Vec<&Workspace> {
    let Some(start) = self.index_of(workspace) else {
      return Vec::new();
    };
    self
      .closure(start, options, direction)
      .into_iter()
      .map(|idx| &self.graph[idx])
      .collect()
  }

  fn closure(&self, start: NodeIndex, options: &QueryOptions, direction: Direction) -> Vec<NodeIndex> {
    // The start node counts as visited so cycles never lead back into it
    let mut visited = HashSet::from([start]);
    let mut found = Vec::new();
    match direction {
      Direction::Dependencies => self.visit_dependencies(start, options, &mut visited, &mut found),
      Direction::Dependents => self.visit_dependents(start, options, &mut visited, &mut found),
    }
    found
  }

  fn visit_dependencies(
    &self,
    from: NodeIndex,
    options: &QueryOptions,
    visited: &mut HashSet<NodeIndex>,
    found: &mut Vec<NodeIndex>,
  ) {
    let workspace = &self.graph[from];
    for (name, range) in workspace.manifest().dependencies(&options.kinds) {
      let Some(&to) = self.name_to_node.get(&name) else {
        continue;
      };
      let dependency = &self.graph[to];
      if !check(dependency, workspace, &range) || !visited.insert(to) {
        continue;
      }
      found.push(to);
      if options.recursive {
        self.visit_dependencies(to, options, visited, found);
      }
    }
  }

  fn visit_dependents(
    &self,
    target: NodeIndex,
    options: &QueryOptions,
    visited: &mut HashSet<NodeIndex>,
    found: &mut Vec<NodeIndex>,
  ) {
    let workspace = &self.graph[target];
    // node_indices() is root first, then members: the scan order of [root, ...members]
    for idx in self.graph.node_indices() {
      if idx == target {
        continue;
      }
      let dependent = &self.graph[idx];
      let Some(range) = dependent.manifest().dependency_range(workspace.name(), &options.kinds) else {
        continue;
      };
      if !check(workspace, dependent, range) || !visited.insert(idx) {
        continue;
      }
      found.push(idx);
      if options.recursive {
        self.visit_dependents(idx, options, visited, found);
      }
    }
  }
}

/// Does `dependency` satisfy `dependent`'s declared `range`? Logs the decision.
fn check(dependency: &Workspace, dependent: &Workspace, range: &str) -> bool {
  let satisfied = range::satisfies(dependency.version(), range);
  debug!(
    "{}@{} {} {}'s requirement for {}@{}",
    dependency.name(),
    dependency.version(),
    if satisfied { "satisfies" } else { "does not satisfy" },
    dependent.name(),
    dependency.name(),
    range
  );
  satisfied
}
