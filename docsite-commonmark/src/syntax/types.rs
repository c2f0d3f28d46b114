//! Core types and traits for syntax highlighting.

use std::{collections::HashMap, fmt, path::PathBuf};

use super::error::{SyntaxError, SyntaxResult};

/// Name every highlighter must understand as "no particular language".
pub const PLAIN_TEXT: &str = "txt";

/// Trait for syntax highlighting backends.
///
/// Implementations must be usable from several threads at once; highlighting
/// only reads the backend's grammar and theme data.
pub trait SyntaxHighlighter: Send + Sync {
  /// Get the name of this highlighter backend
  fn name(&self) -> &'static str;

  /// Get a list of supported languages
  fn supported_languages(&self) -> Vec<String>;

  /// Get a list of available themes
  fn available_themes(&self) -> Vec<String>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool {
    self
      .supported_languages()
      .iter()
      .any(|lang| lang.eq_ignore_ascii_case(language))
  }

  /// Check if a theme is available
  fn has_theme(&self, theme: &str) -> bool {
    self.available_themes().iter().any(|t| t == theme)
  }

  /// Highlight code with the specified language and theme.
  ///
  /// Returns the inner markup of the code element (styled spans only), not
  /// a complete `<pre>` block.
  ///
  /// # Errors
  ///
  /// Returns an error if the backend fails on this input.
  fn highlight(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<String>;
}

/// Configuration for syntax highlighting
#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Default theme to use when none is specified
  pub default_theme: Option<String>,

  /// Language aliases for mapping common names to supported languages
  pub language_aliases: HashMap<String, String>,

  /// Whether to fall back to plain text for unsupported languages
  pub fallback_to_plain: bool,

  /// Extra Sublime syntax definitions loaded when the backend is built
  pub grammars: Vec<PathBuf>,
}

impl Default for SyntaxConfig {
  fn default() -> Self {
    let language_aliases = [
      ("js", "javascript"),
      ("ts", "typescript"),
      ("py", "python"),
      ("rb", "ruby"),
      ("sh", "bash"),
      ("shell", "bash"),
      ("zsh", "bash"),
      ("yml", "yaml"),
      ("md", "markdown"),
      ("text", PLAIN_TEXT),
      ("plaintext", PLAIN_TEXT),
      ("plain", PLAIN_TEXT),
    ]
    .into_iter()
    .map(|(alias, target)| (alias.to_string(), target.to_string()))
    .collect();

    Self {
      default_theme: None,
      language_aliases,
      fallback_to_plain: true,
      grammars: Vec::new(),
    }
  }
}

impl SyntaxConfig {
  /// Merge extra aliases over the built-in ones. Keys are lower-cased.
  #[must_use]
  pub fn with_aliases<I, K, V>(mut self, aliases: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
  {
    for (alias, target) in aliases {
      self
        .language_aliases
        .insert(alias.as_ref().to_ascii_lowercase(), target.into());
    }
    self
  }
}

/// High-level syntax highlighting manager.
///
/// Wraps a backend with alias resolution, a default theme and the plain-text
/// fallback for languages the backend does not know.
pub struct SyntaxManager {
  highlighter: Box<dyn SyntaxHighlighter>,
  config:      SyntaxConfig,
}

impl fmt::Debug for SyntaxManager {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SyntaxManager")
      .field("highlighter", &self.highlighter.name())
      .field("config", &self.config)
      .finish()
  }
}

impl SyntaxManager {
  /// Create a new syntax manager with the given highlighter and config
  #[must_use]
  pub fn new(
    highlighter: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    if let Some(theme) = config.default_theme.as_deref()
      && !highlighter.has_theme(theme)
    {
      log::warn!(
        "Theme '{theme}' is not available in the {} highlighter, using its \
         default",
        highlighter.name()
      );
    }

    Self {
      highlighter,
      config,
    }
  }

  /// Get the underlying highlighter
  #[must_use]
  pub fn highlighter(&self) -> &dyn SyntaxHighlighter {
    self.highlighter.as_ref()
  }

  /// Get the configuration
  #[must_use]
  pub const fn config(&self) -> &SyntaxConfig {
    &self.config
  }

  /// Resolve a language name using aliases.
  ///
  /// Names are matched case-insensitively; an empty name is plain text.
  #[must_use]
  pub fn resolve_language(&self, language: &str) -> String {
    let language = language.trim().to_ascii_lowercase();
    if language.is_empty() {
      return PLAIN_TEXT.to_string();
    }
    self
      .config
      .language_aliases
      .get(&language)
      .cloned()
      .unwrap_or(language)
  }

  /// Highlight code with automatic language resolution and fallback.
  ///
  /// `None` highlights as plain text.
  ///
  /// # Errors
  ///
  /// Returns an error if the backend fails, or if the language is unknown
  /// and plain-text fallback is disabled.
  pub fn highlight_code(
    &self,
    code: &str,
    language: Option<&str>,
  ) -> SyntaxResult<String> {
    let resolved_language = self.resolve_language(language.unwrap_or(""));
    let theme = self.config.default_theme.as_deref();

    if self.highlighter.supports_language(&resolved_language) {
      return self.highlighter.highlight(code, &resolved_language, theme);
    }

    if self.config.fallback_to_plain {
      log::debug!(
        "Language '{resolved_language}' is not known, highlighting as plain \
         text"
      );
      return self.highlighter.highlight(code, PLAIN_TEXT, theme);
    }

    Err(SyntaxError::UnsupportedLanguage(resolved_language))
  }
}
