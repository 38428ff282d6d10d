use crate::core::error::{ConfigError, RailError, RailResult, ResultExt};
use crate::manifest::{DependencyKind, MANIFEST_FILENAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for monorail
/// Searched in order: monorail.toml, .monorail.toml, .config/monorail.toml
///
/// Every section is optional; a missing file means all defaults.
///
/// # Example
///
/// ```toml
/// [discovery]
/// manifest = "package.json"
/// ignore = ["**/fixtures/**"]
///
/// [graph]
/// kinds = ["dependencies"]
///
/// [changes]
/// base = "origin/main"
/// merge_base = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonorailConfig {
  pub discovery: DiscoveryConfig,
  pub graph: GraphConfig,
  pub changes: ChangesConfig,
}

/// How member packages are found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
  /// Descriptor filename at each package root (default: "package.json")
  pub manifest: String,

  /// Extra exclusion globs, matched against root-relative manifest paths
  pub ignore: Vec<String>,
}

impl Default for DiscoveryConfig {
  fn default() -> Self {
    Self {
      manifest: MANIFEST_FILENAME.to_string(),
      ignore: Vec::new(),
    }
  }
}

/// Default scope for dependency/dependent queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
  /// Dependency tables that count as edges (default: both)
  pub kinds: Vec<DependencyKind>,
}

impl Default for GraphConfig {
  fn default() -> Self {
    Self {
      kinds: DependencyKind::ALL.to_vec(),
    }
  }
}

/// Change detection defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChangesConfig {
  /// Ref to diff against when the caller doesn't give one
  pub base: Option<String>,

  /// Diff against `merge-base(base, HEAD)` instead of `base` itself
  pub merge_base: bool,
}

impl MonorailConfig {
  /// Find config file in search order: monorail.toml, .monorail.toml, .config/monorail.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("monorail.toml"),
      path.join(".monorail.toml"),
      path.join(".config").join("monorail.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the workspace root, falling back to defaults when absent
  pub fn load(path: &Path) -> RailResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::from_toml(&config_path, &content)?;

    tracing::debug!(path = %config_path.display(), "loaded monorail config");
    Ok(config)
  }

  /// Parse and validate config text read from `path`
  pub fn from_toml(path: &Path, content: &str) -> RailResult<Self> {
    let config: MonorailConfig = toml_edit::de::from_str(content).map_err(|e| {
      RailError::Config(ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
      })
    })?;

    config.validate()?;
    Ok(config)
  }

  /// Validate config values
  pub fn validate(&self) -> RailResult<()> {
    if self.discovery.manifest.trim().is_empty() || self.discovery.manifest.contains(['/', '\\']) {
      return Err(RailError::Config(ConfigError::Invalid {
        field: "discovery.manifest".to_string(),
        reason: format!("'{}' must be a plain file name", self.discovery.manifest),
      }));
    }

    if self.graph.kinds.is_empty() {
      return Err(RailError::Config(ConfigError::Invalid {
        field: "graph.kinds".to_string(),
        reason: "at least one dependency kind is required".to_string(),
      }));
    }

    if self.changes.merge_base && self.changes.base.is_none() {
      return Err(RailError::Config(ConfigError::Invalid {
        field: "changes.merge_base".to_string(),
        reason: "merge_base needs changes.base to be set".to_string(),
      }));
    }

    Ok(())
  }
}
