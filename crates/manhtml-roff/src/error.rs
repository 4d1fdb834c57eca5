use std::io;

use thiserror::Error;

/// Errors that stop a conversion.
///
/// Structural problems inside a document (unknown requests, unbalanced
/// margin requests) are never errors; they are recorded as
/// [`Diagnostic`](crate::Diagnostic)s and processing carries on.
#[derive(Debug, Error)]
pub enum RoffError {
  /// Reading from the line source or writing the output failed.
  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  /// The requested output mode is not one of `html`, `jekyll` or `raw`.
  #[error("invalid output mode `{0}` (expected html, jekyll or raw)")]
  InvalidMode(String),

  /// The Jekyll front matter could not be serialized.
  #[error("failed to write front matter: {0}")]
  FrontMatter(#[from] serde_yaml::Error),
}

/// Result type for interpreter operations.
pub type RoffResult<T> = Result<T, RoffError>;
