//! Build-once handle around the highlighting engine.
//!
//! Grammar and theme loading is the most expensive step of the pipeline, so
//! the engine is constructed lazily on first use and then shared read-only.
//! Callers that arrive while construction is in flight block on it and all
//! observe the same outcome, including a failed construction.

use std::{fmt, sync::OnceLock, time::Instant};

use log::{debug, error, warn};

use super::{
  create_default_manager,
  error::{SyntaxError, SyntaxResult},
  types::{SyntaxConfig, SyntaxManager},
};

type EngineFactory = dyn Fn() -> SyntaxResult<SyntaxManager> + Send + Sync;

/// Lazily constructed, shareable syntax highlighting engine.
///
/// Wrap it in an [`std::sync::Arc`] to share one engine between processors
/// and threads.
pub struct HighlighterCache {
  engine:  OnceLock<SyntaxResult<SyntaxManager>>,
  factory: Box<EngineFactory>,
}

impl HighlighterCache {
  /// Cache for the default backend configured with `config`.
  #[must_use]
  pub fn new(config: SyntaxConfig) -> Self {
    Self::with_factory(move || create_default_manager(config.clone()))
  }

  /// Cache for an engine built by `factory`.
  ///
  /// `factory` runs at most once over the lifetime of the cache.
  #[must_use]
  pub fn with_factory<F>(factory: F) -> Self
  where
    F: Fn() -> SyntaxResult<SyntaxManager> + Send + Sync + 'static,
  {
    Self {
      engine:  OnceLock::new(),
      factory: Box::new(factory),
    }
  }

  /// Get the engine, constructing it on first call.
  ///
  /// # Errors
  ///
  /// Returns the construction error. The error is remembered; later calls
  /// return it again without retrying.
  pub fn engine(&self) -> Result<&SyntaxManager, &SyntaxError> {
    self
      .engine
      .get_or_init(|| {
        let started = Instant::now();
        let result = (self.factory)();
        match &result {
          Ok(manager) => {
            debug!(
              "Initialized {} highlighter in {:.2?}",
              manager.highlighter().name(),
              started.elapsed()
            );
          },
          Err(e) => error!("Failed to initialize syntax highlighter: {e}"),
        }
        result
      })
      .as_ref()
  }

  /// Whether construction has already been attempted.
  #[must_use]
  pub fn is_initialized(&self) -> bool {
    self.engine.get().is_some()
  }

  /// Highlight `code` into the inner markup of a `<code>` element.
  fn try_highlight(
    &self,
    code: &str,
    language: Option<&str>,
  ) -> SyntaxResult<String> {
    let engine = self.engine().map_err(Clone::clone)?;
    engine.highlight_code(code, language)
  }

  /// Highlight `code` into a complete `<pre><code>` block.
  ///
  /// Never fails: on any highlighting error the code is emitted escaped and
  /// unstyled, tagged with the requested language (or `text`).
  #[must_use]
  pub fn highlight(&self, code: &str, language: Option<&str>) -> String {
    let class = CodeClass(language);
    match self.try_highlight(code, language) {
      Ok(highlighted) => {
        format!(r#"<pre class="highlight"><code class="{class}">{highlighted}</code></pre>"#)
      },
      Err(e) => {
        warn!(
          "Failed to highlight {} code block: {e}",
          language_or_text(language)
        );
        fallback_block(code, language)
      },
    }
  }
}

impl fmt::Debug for HighlighterCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HighlighterCache")
      .field("initialized", &self.is_initialized())
      .finish_non_exhaustive()
  }
}

/// Unstyled, escaped code block.
#[must_use]
pub fn fallback_block(code: &str, language: Option<&str>) -> String {
  format!(
    r#"<pre><code class="{}">{}</code></pre>"#,
    CodeClass(language),
    html_escape::encode_text(code)
  )
}

fn language_or_text(language: Option<&str>) -> &str {
  language.map(str::trim).filter(|l| !l.is_empty()).unwrap_or("text")
}

/// `language-*` class value for a code element.
struct CodeClass<'a>(pub Option<&'a str>);

impl fmt::Display for CodeClass<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "language-{}",
      html_escape::encode_double_quoted_attribute(language_or_text(self.0))
    )
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use super::*;
  use crate::syntax::{PLAIN_TEXT, SyntaxHighlighter};

  struct UpperHighlighter;

  impl SyntaxHighlighter for UpperHighlighter {
    fn name(&self) -> &'static str {
      "Upper"
    }

    fn supported_languages(&self) -> Vec<String> {
      vec!["shout".to_string(), PLAIN_TEXT.to_string()]
    }

    fn available_themes(&self) -> Vec<String> {
      Vec::new()
    }

    fn highlight(
      &self,
      code: &str,
      language: &str,
      _theme: Option<&str>,
    ) -> SyntaxResult<String> {
      if code.contains("boom") {
        return Err(SyntaxError::HighlightingFailed("boom".to_string()));
      }
      Ok(format!("<span class=\"{language}\">{}</span>", code.to_uppercase()))
    }
  }

  fn upper_cache(counter: Arc<AtomicUsize>) -> HighlighterCache {
    HighlighterCache::with_factory(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok(SyntaxManager::new(
        Box::new(UpperHighlighter),
        SyntaxConfig::default(),
      ))
    })
  }

  #[test]
  fn test_lazy_construction() {
    let counter = Arc::new(AtomicUsize::new(0));
    let cache = upper_cache(Arc::clone(&counter));
    assert!(!cache.is_initialized());
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    let html = cache.highlight("hi", Some("shout"));
    assert_eq!(
      html,
      r#"<pre class="highlight"><code class="language-shout"><span class="shout">HI</span></code></pre>"#
    );
    let _ = cache.highlight("again", None);
    assert!(cache.is_initialized());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_block_failure_falls_back_to_escaped_code() {
    let cache = upper_cache(Arc::new(AtomicUsize::new(0)));
    let html = cache.highlight("boom <b>", Some("shout"));
    assert_eq!(
      html,
      r#"<pre><code class="language-shout">boom &lt;b&gt;</code></pre>"#
    );
  }

  #[test]
  fn test_failed_construction_is_remembered() {
    let counter = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&counter);
    let cache = HighlighterCache::with_factory(move || {
      calls.fetch_add(1, Ordering::SeqCst);
      Err(SyntaxError::BackendError("no grammars".to_string()))
    });

    assert!(cache.engine().is_err());
    assert_eq!(
      cache.highlight("x < y", None),
      r#"<pre><code class="language-text">x &lt; y</code></pre>"#
    );
    assert_eq!(
      cache.highlight("a&b", Some("rust")),
      r#"<pre><code class="language-rust">a&amp;b</code></pre>"#
    );
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_code_class_escapes_language() {
    assert_eq!(CodeClass(None).to_string(), "language-text");
    assert_eq!(CodeClass(Some("  ")).to_string(), "language-text");
    assert_eq!(CodeClass(Some("a\"b")).to_string(), "language-a&quot;b");
  }
}
