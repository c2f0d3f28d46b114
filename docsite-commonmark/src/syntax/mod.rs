//! Provides a trait-based architecture for syntax highlighting that allows
//! backends to be plugged in behind [`SyntaxHighlighter`].
//!
//! The bundled backend is **Syntect**, using Sublime Text syntax definitions
//! with two-face added for extended grammars and themes. Construction is
//! expensive, so callers normally go through [`HighlighterCache`], which
//! builds the backend at most once.

pub mod cache;
pub mod error;
pub mod types;

mod syntect;

pub use cache::HighlighterCache;
pub use error::{SyntaxError, SyntaxResult};
pub use syntect::{SyntectHighlighter, create_syntect_manager};
pub use types::{PLAIN_TEXT, SyntaxConfig, SyntaxHighlighter, SyntaxManager};

/// Create the default syntax manager for `config`.
///
/// # Errors
///
/// Returns an error if backend initialization fails, for example when one of
/// the configured grammar files cannot be loaded.
pub fn create_default_manager(
  config: SyntaxConfig,
) -> SyntaxResult<SyntaxManager> {
  create_syntect_manager(config)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_manager_resolves_aliases() {
    let manager = create_default_manager(SyntaxConfig::default())
      .expect("Failed to create default syntax manager");

    assert_eq!(manager.resolve_language("js"), "javascript");
    assert_eq!(manager.resolve_language("py"), "python");
    assert_eq!(manager.resolve_language("ts"), "typescript");
    assert_eq!(manager.resolve_language("rust"), "rust");
    assert_eq!(manager.config().default_theme.as_deref(), Some("InspiredGitHub"));
  }

  #[test]
  fn test_extended_theme_availability() {
    let manager = create_default_manager(SyntaxConfig::default())
      .expect("Failed to create default syntax manager");
    let themes = manager.highlighter().available_themes();

    assert!(
      themes.len() > 30,
      "Expected > 30 themes, got {}",
      themes.len()
    );
    for expected in ["Nord", "Dracula", "GruvboxDark", "InspiredGitHub"] {
      assert!(
        themes.iter().any(|t| t == expected),
        "Expected {expected} theme"
      );
    }
  }

  #[test]
  fn test_common_languages_highlight() {
    let manager = create_default_manager(SyntaxConfig::default())
      .expect("Failed to create default syntax manager");

    for (lang, code) in [
      ("javascript", "const x = 1;"),
      ("ts", "let y: number = 2;"),
      ("html", "<p>hi</p>"),
      ("css", "a { color: red; }"),
      ("json", "{\"a\": 1}"),
      ("sh", "echo hi"),
      ("tokenscript", "variable x: Number = 1;"),
    ] {
      let html = manager.highlight_code(code, Some(lang));
      assert!(
        html.as_ref().is_ok_and(|h| h.contains("<span")),
        "Failed to highlight {lang}: {html:?}"
      );
    }
  }
}
