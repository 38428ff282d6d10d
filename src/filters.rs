//! Workspace predicates
//!
//! Small composable filters for narrowing a workspace list:
//!
//! ```ignore
//! let public_with_tests = filters::and(vec![
//!   filters::not(filters::is_private()),
//!   filters::script_exists("test"),
//! ]);
//! let selected: Vec<_> = graph.workspaces().filter(|w| public_with_tests(w)).collect();
//! ```

use crate::core::error::{RailError, RailResult};
use crate::core::vcs::ChangeSet;
use crate::graph::{Workspace, is_changed};
use glob::{MatchOptions, Pattern};

/// A boxed workspace predicate
pub type Filter = Box<dyn Fn(&Workspace) -> bool + Send + Sync>;

/// `*` stops at `/`, so `@scope/*` matches `@scope/ui` but not `@scope/ui/x`
const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: false,
};

pub fn is_private() -> Filter {
  Box::new(|workspace: &Workspace| workspace.is_private())
}

/// Package name matches a glob
pub fn name_matches(pattern: &str) -> RailResult<Filter> {
  let pattern = compile(pattern)?;
  Ok(Box::new(move |workspace: &Workspace| pattern.matches_with(workspace.name(), MATCH_OPTIONS)))
}

/// Package directory matches a glob
pub fn directory_matches(pattern: &str) -> RailResult<Filter> {
  let pattern = compile(pattern)?;
  Ok(Box::new(move |workspace: &Workspace| {
    pattern.matches_path_with(workspace.directory(), MATCH_OPTIONS)
  }))
}

/// Script exists with a non-empty command
pub fn script_exists(script: &str) -> Filter {
  let script = script.to_string();
  Box::new(move |workspace: &Workspace| workspace.has_script(&script))
}

/// Workspace contains a file from `change_set`
pub fn has_changed(change_set: ChangeSet) -> Filter {
  Box::new(move |workspace: &Workspace| is_changed(workspace, &change_set))
}

pub fn not(filter: Filter) -> Filter {
  Box::new(move |workspace: &Workspace| !filter(workspace))
}

/// All filters pass. An empty list passes everything.
pub fn and(filters: Vec<Filter>) -> Filter {
  Box::new(move |workspace: &Workspace| filters.iter().all(|f| f(workspace)))
}

/// Any filter passes. An empty list passes nothing.
pub fn or(filters: Vec<Filter>) -> Filter {
  Box::new(move |workspace: &Workspace| filters.iter().any(|f| f(workspace)))
}

fn compile(pattern: &str) -> RailResult<Pattern> {
  Pattern::new(pattern).map_err(|source| RailError::Pattern {
    pattern: pattern.to_string(),
    source,
  })
}
