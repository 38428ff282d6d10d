//! Selector expressions
//!
//! Compact package selectors in the pnpm/turbo style:
//!
//! | expression | meaning |
//! |------------|---------|
//! | `foo`      | `foo` only |
//! | `foo...`   | `foo` and its dependencies |
//! | `foo^...`  | `foo`'s dependencies, without `foo` |
//! | `...foo`   | `foo` and its dependents |
//! | `...^foo`  | `foo`'s dependents, without `foo` |
//! | `!foo`     | exclude whatever the rest selects |
//!
//! Parsing is purely textual. The name may be a glob; nothing here resolves it.

use crate::core::error::RailError;
use std::str::FromStr;

const ELLIPSIS: &str = "...";

/// Parsed selector expression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDirective {
  /// Leading `!`
  pub exclude: bool,
  /// What remains after the markers are stripped; `None` when nothing does
  pub name: Option<String>,
  /// `^` next to either ellipsis
  pub exclude_self: bool,
  /// Trailing `...`
  pub include_dependencies: bool,
  /// Leading `...`
  pub include_dependents: bool,
}

/// Parse a selector expression. Never fails; each marker is stripped at most once.
pub fn parse(expression: &str) -> SelectionDirective {
  let mut directive = SelectionDirective::default();
  let mut rest = expression;

  if let Some(stripped) = rest.strip_prefix('!') {
    directive.exclude = true;
    rest = stripped;
  }

  if let Some(stripped) = rest.strip_suffix(ELLIPSIS) {
    directive.include_dependencies = true;
    rest = stripped;
    if let Some(stripped) = rest.strip_suffix('^') {
      directive.exclude_self = true;
      rest = stripped;
    }
  }

  if let Some(stripped) = rest.strip_prefix(ELLIPSIS) {
    directive.include_dependents = true;
    rest = stripped;
    if let Some(stripped) = rest.strip_prefix('^') {
      directive.exclude_self = true;
      rest = stripped;
    }
  }

  if !rest.is_empty() {
    directive.name = Some(rest.to_string());
  }
  directive
}

impl FromStr for SelectionDirective {
  type Err = RailError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(parse(s))
  }
}
