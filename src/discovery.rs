//! Package discovery
//!
//! Root manifest → workspace globs → member manifest files → loaded manifests.
//!
//! File matching is behind [`FileDiscovery`] so callers (and tests) can swap
//! the glob engine. [`GlobDiscovery`] is the default, built on the `glob` crate.

use crate::core::error::{RailError, RailResult};
use crate::manifest::{MANIFEST_FILENAME, Manifest};
use glob::{MatchOptions, Pattern};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directories never searched for members
const PRUNED_DIRS: &[&str] = &["node_modules", ".git"];

/// Expands glob patterns into file paths.
pub trait FileDiscovery {
  /// Match `patterns` relative to `cwd`. Returned paths are `cwd`-joined.
  /// Patterns prefixed with `!` exclude what they match.
  fn find(&self, patterns: &[String], cwd: &Path) -> RailResult<Vec<PathBuf>>;
}

/// Default [`FileDiscovery`] built on the `glob` crate.
///
/// Results are sorted and de-duplicated, and anything under `node_modules` or
/// `.git` is skipped.
#[derive(Debug, Clone, Default)]
pub struct GlobDiscovery {
  ignore: Vec<Pattern>,
}

impl GlobDiscovery {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add exclusion globs, matched against `cwd`-relative paths
  pub fn with_ignore(patterns: &[String]) -> RailResult<Self> {
    let ignore = patterns.iter().map(|p| compile(p)).collect::<RailResult<Vec<_>>>()?;
    Ok(Self { ignore })
  }
}

impl FileDiscovery for GlobDiscovery {
  fn find(&self, patterns: &[String], cwd: &Path) -> RailResult<Vec<PathBuf>> {
    let mut includes = Vec::new();
    let mut excludes = self.ignore.clone();
    for pattern in patterns {
      match pattern.strip_prefix('!') {
        Some(negated) => excludes.push(compile(negated)?),
        None => includes.push(pattern),
      }
    }

    // `*` never crosses a `/` and never matches a dot-directory
    let options = MatchOptions {
      require_literal_separator: true,
      require_literal_leading_dot: true,
      ..MatchOptions::new()
    };
    let escaped_cwd = Pattern::escape(&cwd.to_string_lossy());

    let mut found = BTreeSet::new();
    for pattern in includes {
      let pattern_rel = pattern.trim_start_matches("./");
      let full = if escaped_cwd.is_empty() {
        pattern_rel.to_string()
      } else {
        format!("{}/{}", escaped_cwd.trim_end_matches('/'), pattern_rel)
      };
      let paths = glob::glob_with(&full, options).map_err(|source| RailError::Pattern {
        pattern: pattern.clone(),
        source,
      })?;

      for entry in paths {
        let path = entry.map_err(|e| RailError::Io(e.into()))?;
        let relative = path.strip_prefix(cwd).unwrap_or(&path);

        if relative
          .components()
          .any(|c| PRUNED_DIRS.iter().any(|d| c.as_os_str() == *d))
        {
          continue;
        }
        if excludes.iter().any(|p| p.matches_path_with(relative, options)) {
          debug!(path = %relative.display(), "excluded by pattern");
          continue;
        }

        found.insert(path);
      }
    }

    Ok(found.into_iter().collect())
  }
}

fn compile(pattern: &str) -> RailResult<Pattern> {
  Pattern::new(pattern).map_err(|source| RailError::Pattern {
    pattern: pattern.to_string(),
    source,
  })
}

/// A discovered monorepo: the root manifest and every member manifest.
#[derive(Debug, Clone)]
pub struct Packages {
  pub root: Manifest,
  pub members: Vec<Manifest>,
}

/// Discover packages under `root_directory` with the default glob engine.
pub fn discover(root_directory: &Path) -> RailResult<Packages> {
  discover_with(root_directory, &GlobDiscovery::new(), MANIFEST_FILENAME)
}

/// Discover packages with an explicit file discovery and descriptor filename.
///
/// Member manifests load in parallel; the first failure aborts discovery and
/// no partial result is returned. Member order follows the discovery's output
/// but callers should not rely on it.
pub fn discover_with(
  root_directory: &Path,
  discovery: &dyn FileDiscovery,
  manifest_name: &str,
) -> RailResult<Packages> {
  let root_file = root_directory.join(manifest_name);
  let root = Manifest::load(&root_file)?;

  let patterns: Vec<String> = root
    .workspace_patterns()
    .iter()
    .map(|pattern| format!("{}/{}", pattern.trim_end_matches('/'), manifest_name))
    .collect();

  let files: Vec<PathBuf> = if patterns.is_empty() {
    Vec::new()
  } else {
    discovery.find(&patterns, root_directory)?
  };

  // a "." pattern would otherwise pick the root up as its own member
  let files: Vec<PathBuf> = files
    .into_iter()
    .filter(|f| crate::utils::normalize(f) != crate::utils::normalize(&root_file))
    .collect();

  debug!(
    root = %root_directory.display(),
    patterns = ?root.workspace_patterns(),
    found = files.len(),
    "discovered workspace manifests"
  );

  let members = files
    .par_iter()
    .map(|file| Manifest::load(file))
    .collect::<RailResult<Vec<_>>>()?;

  Ok(Packages { root, members })
}
