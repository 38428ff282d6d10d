//! Utility functions for cross-platform path handling

use std::path::{Component, Path, PathBuf};

/// Convert a path to Git format (always forward slashes)
///
/// Git expects paths with forward slashes, even on Windows.
/// This function converts backslashes to forward slashes for use in Git commands.
pub fn path_to_git_format(path: &Path) -> String {
  // On Windows, convert backslashes to forward slashes
  // On Unix, this is a no-op since paths already use forward slashes
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}

/// Drop `.` components so `./packages/foo` and `packages/foo` compare equal.
///
/// Purely lexical: `..` is kept and symlinks are not resolved.
pub fn normalize(path: &Path) -> PathBuf {
  path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

/// Is `file` strictly inside `directory`?
///
/// Compares whole path components, so `packages/foo` does not contain
/// `packages/foobar/index.js`, and a directory does not contain itself.
pub fn is_within(file: &Path, directory: &Path) -> bool {
  let file = normalize(file);
  let directory = normalize(directory);
  file != directory && file.starts_with(&directory)
}
