//! Workspace dependency graph
//!
//! Built on petgraph for direct control and minimal abstraction. Edges exist
//! only where the declared range is satisfied by the target's version.

pub mod changed;
pub mod range;
pub mod workspace_graph;

pub use changed::{changed_members, is_changed};
pub use workspace_graph::{Inclusion, MembersOptions, QueryOptions, Workspace, WorkspaceGraph};
