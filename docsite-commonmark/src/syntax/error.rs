//! Error types for syntax highlighting operations.

/// Result type for syntax highlighting operations.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Errors that can occur during syntax highlighting.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
  #[error("Language '{0}' is not supported by this highlighter")]
  UnsupportedLanguage(String),
  #[error("Theme '{0}' is not available")]
  ThemeNotFound(String),
  #[error("Highlighting failed: {0}")]
  HighlightingFailed(String),
  #[error("Backend initialization failed: {0}")]
  BackendError(String),
  #[error("Failed to load grammar '{name}': {message}")]
  GrammarLoad { name: String, message: String },
}
