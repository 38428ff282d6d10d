//! Core building blocks shared by every monorail operation
//!
//! - **config**: monorail.toml parsing and validation
//! - **context**: Unified workspace context, built once and shared
//! - **error**: Error types with contextual help messages
//! - **vcs**: Change detection through system git

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
