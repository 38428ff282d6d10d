//! Change detection through version control
//!
//! The graph only ever sees a [`ChangeSet`]; where it comes from is behind
//! [`ChangeSetProvider`]. [`SystemGit`] is the implementation backed by the
//! system `git` binary.

pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::RailResult;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Changed file path → status code (`M`, `A`, `D`, `R100`, ...)
pub type ChangeSet = BTreeMap<PathBuf, String>;

/// What to diff
#[derive(Debug, Clone, Default)]
pub struct DiffRequest {
  /// Directory to run the diff in; paths come back joined onto it
  pub cwd: Option<PathBuf>,
  /// Commit-ish to diff against. `None` diffs the working tree against the index.
  pub since: Option<String>,
  /// Restrict the diff to these paths
  pub files: Vec<PathBuf>,
}

impl DiffRequest {
  pub fn since(since: impl Into<String>) -> Self {
    Self {
      since: Some(since.into()),
      ..Default::default()
    }
  }
}

/// Source of changed files
pub trait ChangeSetProvider {
  fn changed_files(&self, request: &DiffRequest) -> RailResult<ChangeSet>;
}
