//! package.json model
//!
//! A `Manifest` is one validated package descriptor. Only `name` and `version`
//! are required; everything else is read leniently and the raw JSON is kept so
//! fields we don't interpret survive untouched.

use crate::core::error::{RailError, RailResult, SchemaError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Canonical descriptor filename at every package root
pub const MANIFEST_FILENAME: &str = "package.json";

/// Which dependency table a range was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
  /// `dependencies`
  Dependencies,
  /// `devDependencies`
  DevDependencies,
}

impl DependencyKind {
  /// Default query scope, in precedence order
  pub const ALL: [DependencyKind; 2] = [DependencyKind::Dependencies, DependencyKind::DevDependencies];

  /// The package.json key holding this table
  pub fn key(self) -> &'static str {
    match self {
      DependencyKind::Dependencies => "dependencies",
      DependencyKind::DevDependencies => "devDependencies",
    }
  }
}

/// `workspaces` is either a bare array or `{ "packages": [...] }` (yarn classic)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkspaceSpec {
  Array(Vec<String>),
  Object { packages: Vec<String> },
}

impl WorkspaceSpec {
  fn into_patterns(self) -> Vec<String> {
    match self {
      WorkspaceSpec::Array(patterns) => patterns,
      WorkspaceSpec::Object { packages } => packages,
    }
  }
}

/// A validated package descriptor.
#[derive(Debug, Clone)]
pub struct Manifest {
  source_path: PathBuf,
  name: String,
  version: String,
  is_private: bool,
  workspace_patterns: Vec<String>,
  scripts: IndexMap<String, String>,
  dependencies: IndexMap<String, String>,
  dev_dependencies: IndexMap<String, String>,
  json: Value,
}

impl Manifest {
  /// Read and validate the descriptor at `path`.
  ///
  /// # Errors
  /// - `NotFound` when the file cannot be read (io message preserved)
  /// - `Parse` when the content is not JSON
  /// - `Schema` when the JSON is not an object or lacks a string name/version
  pub fn load(path: &Path) -> RailResult<Self> {
    let content = std::fs::read_to_string(path).map_err(|source| RailError::NotFound {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(path, &content)
  }

  /// Parse descriptor text that was read from `path`.
  pub fn parse(path: impl Into<PathBuf>, content: &str) -> RailResult<Self> {
    let path = path.into();
    let json: Value = serde_json::from_str(content).map_err(|source| RailError::Parse {
      path: path.clone(),
      source,
    })?;
    Self::from_json(path, json)
  }

  /// Validate an already-parsed descriptor.
  pub fn from_json(path: impl Into<PathBuf>, json: Value) -> RailResult<Self> {
    let path = path.into();
    let schema = |kind| RailError::Schema {
      path: path.clone(),
      kind,
    };

    let object = json.as_object().ok_or_else(|| schema(SchemaError::InvalidManifest))?;

    let name = match object.get("name") {
      Some(Value::String(name)) if !name.is_empty() => name.clone(),
      _ => return Err(schema(SchemaError::InvalidName)),
    };
    let version = match object.get("version") {
      Some(Value::String(version)) => version.clone(),
      _ => return Err(schema(SchemaError::InvalidVersion)),
    };

    let workspace_patterns = object
      .get("workspaces")
      .and_then(|v| serde_json::from_value::<WorkspaceSpec>(v.clone()).ok())
      .map(WorkspaceSpec::into_patterns)
      .unwrap_or_default();

    Ok(Self {
      is_private: matches!(object.get("private"), Some(Value::Bool(true))),
      scripts: string_table(object.get("scripts")),
      dependencies: string_table(object.get(DependencyKind::Dependencies.key())),
      dev_dependencies: string_table(object.get(DependencyKind::DevDependencies.key())),
      workspace_patterns,
      name,
      version,
      source_path: path,
      json,
    })
  }

  /// Location of the descriptor file
  pub fn source_path(&self) -> &Path {
    &self.source_path
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn version(&self) -> &str {
    &self.version
  }

  pub fn is_private(&self) -> bool {
    self.is_private
  }

  /// Workspace globs (only meaningful on the root). Always a list.
  pub fn workspace_patterns(&self) -> &[String] {
    &self.workspace_patterns
  }

  /// Command for a script, if declared
  pub fn script(&self, name: &str) -> Option<&str> {
    self.scripts.get(name).map(String::as_str)
  }

  /// The raw declared table for one kind (ranges as written, empty ones included)
  pub fn dependency_table(&self, kind: DependencyKind) -> &IndexMap<String, String> {
    match kind {
      DependencyKind::Dependencies => &self.dependencies,
      DependencyKind::DevDependencies => &self.dev_dependencies,
    }
  }

  /// Union of declared ranges across `kinds`, in the order given.
  ///
  /// Empty ranges are skipped. A name declared under several kinds keeps the
  /// position of its first declaration and the range of its last non-empty one.
  pub fn dependencies(&self, kinds: &[DependencyKind]) -> IndexMap<String, String> {
    let mut combined = IndexMap::new();
    for kind in kinds {
      for (name, range) in self.dependency_table(*kind) {
        if !range.is_empty() {
          combined.insert(name.clone(), range.clone());
        }
      }
    }
    combined
  }

  /// Declared range for one dependency name across `kinds`
  pub fn dependency_range(&self, name: &str, kinds: &[DependencyKind]) -> Option<&str> {
    kinds
      .iter()
      .filter_map(|kind| self.dependency_table(*kind).get(name))
      .filter(|range| !range.is_empty())
      .last()
      .map(String::as_str)
  }

  /// The descriptor as parsed, unknown fields included
  pub fn json(&self) -> &Value {
    &self.json
  }
}

/// Read a `{ string: string }` table, ignoring non-string values
fn string_table(value: Option<&Value>) -> IndexMap<String, String> {
  value
    .and_then(Value::as_object)
    .map(|object| {
      object
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
    })
    .unwrap_or_default()
}
