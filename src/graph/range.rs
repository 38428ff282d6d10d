//! npm-style range satisfaction on top of the `semver` crate
//!
//! `semver::VersionReq` speaks Cargo's dialect: comma-separated comparators and
//! a bare `1.2.3` meaning `^1.2.3`. package.json ranges use npm's dialect:
//! whitespace-separated comparators, `||` alternatives, hyphen ranges, x-ranges
//! and a bare version meaning an exact match. This module translates the latter
//! into a set of `VersionReq`s.
//!
//! Anything we can't translate (dist-tags, URLs, `file:` specs) is simply never
//! satisfied. Nothing here returns an error.

use semver::{Version, VersionReq};

const WORKSPACE_PROTOCOL: &str = "workspace:";

/// A parsed npm range: satisfied when any alternative matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
  /// Accepts every version, prereleases included (`VersionReq::STAR` doesn't)
  any: bool,
  alternatives: Vec<VersionReq>,
}

impl VersionRange {
  /// Translate an npm range. Returns `None` for specs that aren't ranges.
  pub fn parse(range: &str) -> Option<Self> {
    let mut range = range.trim();

    if let Some(rest) = range.strip_prefix(WORKSPACE_PROTOCOL) {
      // workspace:* / workspace:^ / workspace:~ all mean "whatever the workspace has"
      if matches!(rest.trim(), "" | "*" | "^" | "~") {
        return Some(Self::any());
      }
      range = rest.trim();
    }

    let alternatives = range
      .split("||")
      .map(translate_comparator_set)
      .map(|set| set.and_then(|s| VersionReq::parse(&s).ok()))
      .collect::<Option<Vec<_>>>()?;

    Some(Self {
      any: false,
      alternatives,
    })
  }

  /// The range every version satisfies, prereleases included
  pub fn any() -> Self {
    Self {
      any: true,
      alternatives: Vec::new(),
    }
  }

  pub fn matches(&self, version: &Version) -> bool {
    self.any || self.alternatives.iter().any(|req| req.matches(version))
  }
}

/// Parse a concrete version, tolerating the `v`/`=` prefixes npm accepts
pub fn parse_version(version: &str) -> Option<Version> {
  let trimmed = version.trim().trim_start_matches('=').trim_start_matches('v');
  Version::parse(trimmed).ok()
}

/// Does `version` satisfy `range`? False when either side doesn't parse.
pub fn satisfies(version: &str, range: &str) -> bool {
  match (parse_version(version), VersionRange::parse(range)) {
    (Some(version), Some(range)) => range.matches(&version),
    _ => false,
  }
}

/// One `||` alternative → a Cargo-style comma-separated requirement string
fn translate_comparator_set(set: &str) -> Option<String> {
  let set = set.trim();

  if let Some((low, high)) = split_hyphen_range(set) {
    // a wildcard side (`1.2.3 - *`) leaves that side unbounded
    let low = translate_comparator(&format!(">={}", low))?;
    let high = translate_comparator(&format!("<={}", high))?;
    let bounds: Vec<String> = [low, high].into_iter().flatten().collect();
    if bounds.is_empty() {
      return Some("*".to_string());
    }
    return Some(join(bounds));
  }

  let mut comparators = Vec::new();
  let mut pending_op: Option<&str> = None;
  for token in set.split_whitespace() {
    // `>= 1.2.3` is legal in npm; glue a lone operator onto what follows
    if is_operator(token) {
      pending_op = Some(token);
      continue;
    }
    let token = match pending_op.take() {
      Some(op) => format!("{}{}", op, token),
      None => token.to_string(),
    };
    if let Some(comparator) = translate_comparator(&token)? {
      comparators.push(comparator);
    }
  }

  if pending_op.is_some() {
    return None;
  }

  if comparators.is_empty() {
    return Some("*".to_string());
  }
  Some(join(comparators))
}

/// One comparator. `Some(None)` means "matches anything" and can be dropped.
fn translate_comparator(token: &str) -> Option<Option<String>> {
  let (op, body) = split_operator(token);
  let body = body.trim_start_matches('v');

  let mut parts: Vec<&str> = Vec::new();
  let mut wildcard = false;
  for part in body.split('.') {
    if matches!(part, "*" | "x" | "X") {
      wildcard = true;
      break;
    }
    parts.push(part);
  }

  if parts.is_empty() {
    // `*`, `>=*`, `x`, ...
    return Some(None);
  }

  let version = parts.join(".");
  let comparator = match op {
    // Bare partial or x-range: `1` / `1.2` / `1.x` are npm x-ranges
    "" if wildcard || parts.len() < 3 => format!("{}.*", version),
    // Bare full version is an exact match in npm (caret in Cargo)
    "" => format!("={}", version),
    op => format!("{}{}", op, version),
  };
  Some(Some(comparator))
}

fn split_operator(token: &str) -> (&str, &str) {
  for op in [">=", "<=", ">", "<", "=", "^", "~"] {
    if let Some(rest) = token.strip_prefix(op) {
      return (op, rest.trim());
    }
  }
  ("", token)
}

fn is_operator(token: &str) -> bool {
  matches!(token, ">=" | "<=" | ">" | "<" | "=" | "^" | "~")
}

fn split_hyphen_range(set: &str) -> Option<(&str, &str)> {
  let (low, high) = set.split_once(" - ")?;
  Some((low.trim(), high.trim()))
}

fn join(comparators: Vec<String>) -> String {
  comparators.join(", ")
}
