//! Integration tests for code fence highlighting and the shared engine.
#![allow(clippy::expect_used, reason = "Fine in tests")]

use std::{
  sync::{
    Arc,
    Barrier,
    atomic::{AtomicUsize, Ordering},
  },
  thread,
  time::Duration,
};

use docsite_commonmark::{
  CompileStrategy,
  HighlighterCache,
  MarkdownOptions,
  MarkdownProcessor,
  SyntaxConfig,
  SyntaxError,
  SyntaxHighlighter,
  SyntaxManager,
  SyntaxResult,
  create_default_manager,
};

const THREADS: usize = 8;

fn counting_cache(
  constructions: Arc<AtomicUsize>,
  succeed: bool,
) -> HighlighterCache {
  HighlighterCache::with_factory(move || {
    constructions.fetch_add(1, Ordering::SeqCst);
    // Widen the window in which other callers arrive mid-construction
    thread::sleep(Duration::from_millis(50));
    if succeed {
      create_default_manager(SyntaxConfig::default())
    } else {
      Err(SyntaxError::BackendError("grammar set unavailable".to_string()))
    }
  })
}

fn run_concurrently(cache: &Arc<HighlighterCache>) -> Vec<String> {
  let barrier = Arc::new(Barrier::new(THREADS));
  let handles: Vec<_> = (0..THREADS)
    .map(|i| {
      let cache = Arc::clone(cache);
      let barrier = Arc::clone(&barrier);
      thread::spawn(move || {
        barrier.wait();
        cache.highlight(&format!("let x{i} = {i};"), Some("rust"))
      })
    })
    .collect();

  handles
    .into_iter()
    .map(|handle| handle.join().expect("highlight thread panicked"))
    .collect()
}

#[test]
fn test_concurrent_first_use_constructs_once() {
  let constructions = Arc::new(AtomicUsize::new(0));
  let cache = Arc::new(counting_cache(Arc::clone(&constructions), true));

  let outputs = run_concurrently(&cache);

  assert_eq!(constructions.load(Ordering::SeqCst), 1);
  assert_eq!(outputs.len(), THREADS);
  for (i, html) in outputs.iter().enumerate() {
    assert!(html.starts_with(r#"<pre class="highlight"><code class="language-rust">"#));
    assert!(html.contains(&format!("x{i}")));
  }
}

#[test]
fn test_concurrent_first_use_fails_identically() {
  let constructions = Arc::new(AtomicUsize::new(0));
  let cache = Arc::new(counting_cache(Arc::clone(&constructions), false));

  let outputs = run_concurrently(&cache);

  assert_eq!(constructions.load(Ordering::SeqCst), 1);
  for (i, html) in outputs.iter().enumerate() {
    assert_eq!(
      html,
      &format!(r#"<pre><code class="language-rust">let x{i} = {i};</code></pre>"#)
    );
  }
  let err = cache.engine().expect_err("construction failed");
  assert!(matches!(err, SyntaxError::BackendError(_)));
}

#[test]
fn test_processors_share_one_engine() {
  let constructions = Arc::new(AtomicUsize::new(0));
  let cache = Arc::new(counting_cache(Arc::clone(&constructions), true));

  let first = MarkdownProcessor::with_highlighter(MarkdownOptions::default(), Arc::clone(&cache));
  let second = first.clone();
  let third = MarkdownProcessor::with_highlighter(MarkdownOptions::default(), Arc::clone(&cache));

  assert!(!cache.is_initialized());
  for processor in [&first, &second, &third] {
    let result = processor.render("```sh\necho hi\n```\n");
    assert!(result.html.contains(r#"<pre class="highlight">"#));
  }
  assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unknown_language_never_fails() {
  let cache = HighlighterCache::new(SyntaxConfig::default());
  let html = cache.highlight("if a < b && c > d { }", Some("klingon"));

  assert!(html.contains(r#"<code class="language-klingon">"#));
  assert!(html.contains("&lt;"));
  assert!(html.contains("&amp;&amp;"));
  assert!(!html.contains("a < b"));
}

#[test]
fn test_fence_without_language_is_text() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let result = processor.render("```\n<b>bold?</b>\n```\n");

  assert!(result.html.contains(r#"<pre class="highlight"><code class="language-text">"#));
  assert!(result.html.contains("&lt;b&gt;"));
  assert!(!result.html.contains("<b>bold?</b>"));
}

#[test]
fn test_fence_with_failed_engine_degrades() {
  let cache = Arc::new(HighlighterCache::with_factory(|| {
    Err(SyntaxError::BackendError("broken".to_string()))
  }));
  let processor =
    MarkdownProcessor::with_highlighter(MarkdownOptions::default(), cache);

  let result = processor.render("# Code\n\n```rust\nlet v = 1 < 2;\n```\n");
  assert!(result.html.contains(r#"<pre><code class="language-rust">let v = 1 &lt; 2;"#));
  assert_eq!(result.headings.len(), 1);
}

/// Backend that builds fine but fails on every block.
struct FailingHighlighter;

impl SyntaxHighlighter for FailingHighlighter {
  fn name(&self) -> &'static str {
    "Failing"
  }

  fn supported_languages(&self) -> Vec<String> {
    vec!["rust".to_string(), "txt".to_string()]
  }

  fn available_themes(&self) -> Vec<String> {
    Vec::new()
  }

  fn highlight(
    &self,
    _code: &str,
    language: &str,
    _theme: Option<&str>,
  ) -> SyntaxResult<String> {
    Err(SyntaxError::HighlightingFailed(format!("no rules for {language}")))
  }
}

#[test]
fn test_failed_block_matches_cache_fallback() {
  let cache = Arc::new(HighlighterCache::with_factory(|| {
    Ok(SyntaxManager::new(
      Box::new(FailingHighlighter),
      SyntaxConfig::default(),
    ))
  }));
  assert!(cache.engine().is_ok());

  let processor = MarkdownProcessor::with_highlighter(
    MarkdownOptions::default(),
    Arc::clone(&cache),
  );
  let result = processor.render("```rust\na < b\n```\n");

  assert_eq!(result.html.trim_end(), cache.highlight("a < b\n", Some("rust")));
  assert_eq!(
    result.html.trim_end(),
    "<pre><code class=\"language-rust\">a &lt; b\n</code></pre>"
  );
  assert!(!result.html.contains("highlight"));
}

#[test]
fn test_highlighted_blocks_in_both_strategies() {
  let cache = Arc::new(HighlighterCache::new(SyntaxConfig::default()));
  let source = "# Code\n\n```rust\nfn main() {}\n```\n\n    indented\n";

  for strategy in CompileStrategy::ALL {
    let processor = MarkdownProcessor::with_highlighter(
      MarkdownOptions {
        strategy,
        ..MarkdownOptions::default()
      },
      Arc::clone(&cache),
    );
    let result = processor.render(source);

    assert!(result.html.contains(
      r#"<pre class="highlight"><code class="language-rust">"#
    ));
    assert!(result.html.contains(r#"<code class="language-text">"#));
    assert!(!result.html.contains("data-sourcepos"), "strategy {strategy}");
    assert_eq!(result.headings.len(), 1);
  }
}

#[test]
fn test_tokenscript_fence() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let result = processor.render(
    "```tokenscript\nvariable gap: Number = {spacing.base} * 2;\n```\n",
  );

  assert!(result.html.contains(r#"<code class="language-tokenscript">"#));
  assert!(result.html.contains("<span"));
  assert!(result.html.contains("spacing.base"));
}

#[test]
fn test_configured_alias_and_theme() {
  let config = SyntaxConfig {
    default_theme: Some("Nord".to_string()),
    ..SyntaxConfig::default()
  }
  .with_aliases([("tks-lang", "tokenscript")]);
  let cache = HighlighterCache::new(config);

  let html = cache.highlight("variable x: Number = 1;", Some("tks-lang"));
  assert!(html.starts_with(r#"<pre class="highlight"><code class="language-tks-lang">"#));
  assert!(html.contains("<span"));
}
