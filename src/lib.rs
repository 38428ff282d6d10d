//! monorail - workspace dependency graph for JavaScript monorepos
//!
//! Reads a root `package.json`, discovers the member packages its `workspaces`
//! globs point at, and answers "what does X depend on" / "what depends on X"
//! with edges that exist only when the declared semver range is satisfied.
//!
//! ```ignore
//! use monorail::{QueryOptions, WorkspaceContext};
//!
//! let ctx = WorkspaceContext::build(Path::new("."))?;
//! let core = ctx.graph.get_by_name("@acme/core").ok_or("no such package")?;
//! for dependent in ctx.graph.dependents_of(core, &QueryOptions::recursive()) {
//!   println!("{}", dependent.name());
//! }
//! ```

pub mod core;
pub mod discovery;
pub mod filters;
pub mod graph;
pub mod manifest;
pub mod selector;
pub mod utils;

pub use crate::core::context::WorkspaceContext;
pub use crate::core::error::{RailError, RailResult};
pub use crate::core::vcs::{ChangeSet, ChangeSetProvider, DiffRequest, SystemGit};
pub use discovery::{FileDiscovery, GlobDiscovery, Packages, discover};
pub use graph::{Inclusion, MembersOptions, QueryOptions, Workspace, WorkspaceGraph};
pub use manifest::{DependencyKind, Manifest};
pub use selector::SelectionDirective;
