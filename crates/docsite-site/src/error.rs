use std::{io, path::PathBuf};

use thiserror::Error;

/// Why a page could not be produced.
///
/// Display strings carry the requested route only. Filesystem paths and
/// underlying causes are logged where the failure happens and never end up
/// in these messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
  #[error("Page not found: {route}")]
  NotFound { route: String },

  #[error("Page unavailable: {route}")]
  Unavailable { route: String },
}

impl PageError {
  /// HTTP-style status code for this condition.
  #[must_use]
  pub const fn status(&self) -> u16 {
    match self {
      Self::NotFound { .. } => 404,
      Self::Unavailable { .. } => 500,
    }
  }

  /// The route that was requested.
  #[must_use]
  pub fn route(&self) -> &str {
    match self {
      Self::NotFound { route } | Self::Unavailable { route } => route,
    }
  }
}

/// A directory entry the scanner had to skip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to scan {}: {message}", path.display())]
pub struct ScanError {
  pub path:    PathBuf,
  pub message: String,
}

/// Failure of a whole site build, as opposed to a single page.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("Failed to write {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to serialize {what}: {source}")]
  Serialize {
    what:   String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to create worker pool: {0}")]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
