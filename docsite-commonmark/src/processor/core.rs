//! Core implementation of the Markdown processor.
//!
//! Parsing, explicit anchor extraction and HTML rendering, with headings
//! captured by the configured [`CompileStrategy`].

use std::sync::Arc;

use comrak::{
  Arena,
  adapters::HeadingAdapter,
  nodes::AstNode,
  options::{Options, Plugins},
  parse_document,
};
use log::{error, trace};

use super::{
  adapters::HeadingCollector,
  rescan::assign_heading_ids,
  types::{
    AnchorTransformer,
    AstTransformer,
    CodeBlockTransformer,
    CompileStrategy,
    MarkdownOptions,
    MarkdownProcessor,
  },
};
use crate::{
  syntax::{HighlighterCache, SyntaxConfig},
  types::MarkdownResult,
};

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with the given options.
  ///
  /// When highlighting is enabled the processor gets its own
  /// [`HighlighterCache`] with the default configuration. Use
  /// [`Self::with_highlighter`] to share one engine between processors.
  #[must_use]
  pub fn new(options: MarkdownOptions) -> Self {
    let highlighter = options
      .highlight_code
      .then(|| Arc::new(HighlighterCache::new(SyntaxConfig::default())));
    Self {
      options,
      highlighter,
    }
  }

  /// Create a processor that highlights through a shared `highlighter`.
  ///
  /// The highlighter is ignored when `options.highlight_code` is off.
  #[must_use]
  pub fn with_highlighter(
    options: MarkdownOptions,
    highlighter: Arc<HighlighterCache>,
  ) -> Self {
    let highlighter = options.highlight_code.then_some(highlighter);
    Self {
      options,
      highlighter,
    }
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// The highlighter used for fenced code, if highlighting is enabled.
  #[must_use]
  pub fn highlighter(&self) -> Option<&Arc<HighlighterCache>> {
    self.highlighter.as_ref()
  }

  /// Render Markdown to HTML, collecting headings in document order.
  #[must_use]
  pub fn render(&self, markdown: &str) -> MarkdownResult {
    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, markdown, &options);

    let anchors = AnchorTransformer::default();
    anchors.transform(root);
    let explicit_ids = anchors.into_ids();

    if let Some(highlighter) = self.highlighter.as_deref() {
      CodeBlockTransformer::new(highlighter).transform(root);
    }

    let (html, headings) = match self.options.strategy {
      CompileStrategy::Hook => {
        let collector = HeadingCollector::new(explicit_ids);
        let html = format_document(root, &options, Some(&collector));
        (html, collector.into_headings())
      },
      CompileStrategy::Rescan => {
        let html = format_document(root, &options, None);
        assign_heading_ids(&html, &explicit_ids)
      },
    };

    trace!(
      "Rendered {} bytes of HTML with {} headings using the {} strategy",
      html.len(),
      headings.len(),
      self.options.strategy
    );
    MarkdownResult::new(html, headings)
  }

  /// Build comrak options from `MarkdownOptions`.
  fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    if self.options.gfm {
      options.extension.table = true;
      options.extension.footnotes = true;
      options.extension.strikethrough = true;
      options.extension.tasklist = true;
      options.extension.autolink = true;
    }
    // Authors may embed raw HTML, as in the source documents
    options.render.r#unsafe = true;
    // Ids are assigned by this crate, not by comrak
    options.extension.header_id_prefix = None;
    // Rescanning tells document headings from raw HTML ones by position
    options.render.sourcepos = self.options.strategy == CompileStrategy::Rescan;
    options
  }
}

/// Render `root` to HTML with the given hooks installed.
fn format_document<'a>(
  root: &'a AstNode<'a>,
  options: &Options,
  heading_adapter: Option<&dyn HeadingAdapter>,
) -> String {
  let mut plugins = Plugins::default();
  plugins.render.heading_adapter = heading_adapter;

  let mut html = String::new();
  if let Err(e) =
    comrak::format_html_with_plugins(root, options, &mut html, &plugins)
  {
    error!("Failed to format Markdown as HTML: {e}");
  }
  html
}
