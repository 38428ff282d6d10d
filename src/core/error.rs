//! Error types for monorail with contextual messages
//!
//! One crate-wide error enum. Every variant that a user can act on carries a
//! help message, mirroring how the command layer of a CLI would surface it.
//!
//! Unsatisfied or unknown dependency references are graph facts, not errors:
//! nothing in this module is produced by a dependency/dependent query.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for monorail
#[derive(Debug, Error)]
pub enum RailError {
  /// Descriptor file missing (or unreadable). Keeps the native io message.
  #[error("Failed to read {}: {source}", path.display())]
  NotFound {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// Descriptor content is not valid JSON
  #[error("Failed to parse {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// Descriptor parsed but does not have the required shape
  #[error("{} {kind}", path.display())]
  Schema { path: PathBuf, kind: SchemaError },

  /// Two packages in one graph share a name
  #[error(
    "Duplicate package name '{name}' declared by {} and {}",
    first.display(),
    second.display()
  )]
  DuplicateName {
    name: String,
    first: PathBuf,
    second: PathBuf,
  },

  /// Dependency cycle where an acyclic order was requested
  #[error("Dependency cycle detected involving: {}", members.join(", "))]
  Cycle { members: Vec<String> },

  /// Invalid glob in a workspace pattern or filter
  #[error("Invalid glob pattern '{pattern}': {source}")]
  Pattern {
    pattern: String,
    #[source]
    source: glob::PatternError,
  },

  /// Git operation errors
  #[error(transparent)]
  Git(#[from] GitError),

  /// Configuration errors
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// I/O errors
  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  /// Generic error with message and optional context
  #[error("{message}{}", context.as_ref().map(|c| format!("\n{}", c)).unwrap_or_default())]
  Message { message: String, context: Option<String> },
}

impl RailError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
    }
  }

  /// Add context to an existing error
  ///
  /// `Message` errors accumulate context and bare I/O errors become messages
  /// carrying it. Structured variants already name their path and are
  /// returned untouched.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RailError::Message { message, context } => RailError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
      },
      RailError::Io(source) => RailError::Message {
        message: source.to_string(),
        context: Some(ctx_str),
      },
      _ => self,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RailError::NotFound { .. } => Some("Run from the monorepo root or pass the directory containing package.json.".to_string()),
      RailError::Schema { kind, .. } => Some(kind.help_message()),
      RailError::DuplicateName { name, .. } => Some(format!(
        "Rename one of the packages or exclude it from the workspace patterns so '{}' is unique.",
        name
      )),
      RailError::Git(e) => e.help_message(),
      RailError::Config(e) => e.help_message(),
      _ => None,
    }
  }

  /// True when the error stems from a missing descriptor file
  pub fn is_not_found(&self) -> bool {
    matches!(self, RailError::NotFound { source, .. } if source.kind() == io::ErrorKind::NotFound)
  }
}

impl From<String> for RailError {
  fn from(msg: String) -> Self {
    RailError::message(msg)
  }
}

impl From<&str> for RailError {
  fn from(msg: &str) -> Self {
    RailError::message(msg)
  }
}

/// Ways a parsed descriptor can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchemaError {
  #[error("doesn't contain a valid manifest")]
  InvalidManifest,
  #[error("doesn't contain a valid name")]
  InvalidName,
  #[error("doesn't contain a valid version")]
  InvalidVersion,
}

impl SchemaError {
  fn help_message(&self) -> String {
    match self {
      SchemaError::InvalidManifest => "A package.json must contain a JSON object.".to_string(),
      SchemaError::InvalidName => "Add a non-empty string \"name\" field.".to_string(),
      SchemaError::InvalidVersion => "Add a string \"version\" field, e.g. \"1.0.0\".".to_string(),
    }
  }
}

/// Git operation errors
#[derive(Debug, Error)]
pub enum GitError {
  /// Git command failed
  #[error("Git command failed: {command}\n{stderr}")]
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  #[error("Git repository not found at: {}", path.display())]
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Change detection needs a git checkout. Initialize the repository or check the path: {}",
        path.display()
      )),
      GitError::CommandFailed { stderr, .. } if stderr.contains("unknown revision") => {
        Some("The base ref does not exist locally. Fetch it first (e.g. `git fetch origin main`).".to_string())
      }
      _ => None,
    }
  }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Config file exists but is not valid TOML for our schema
  #[error("Failed to parse config {}: {message}", path.display())]
  Parse { path: PathBuf, message: String },

  /// Config parsed but holds an unusable value
  #[error("Invalid config value for '{field}': {reason}")]
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Parse { .. } => Some("Check monorail.toml for syntax errors or unknown keys.".to_string()),
      ConfigError::Invalid { field, .. } => Some(format!("Remove '{}' to fall back to the default.", field)),
    }
  }
}

/// Result type alias for monorail
pub type RailResult<T> = Result<T, RailError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RailResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RailError>,
{
  fn context(self, ctx: impl Into<String>) -> RailResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}
