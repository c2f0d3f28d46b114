//! Type definitions for the Markdown processor.
//!
//! Contains the configuration options, the processor struct and the AST
//! transformation trait used before rendering.
//!
//! # Examples
//!
//! ```
//! use docsite_commonmark::{CompileStrategy, MarkdownOptions, MarkdownProcessor};
//!
//! let options = MarkdownOptions {
//!   gfm: true,
//!   highlight_code: false,
//!   strategy: CompileStrategy::Rescan,
//! };
//!
//! let processor = MarkdownProcessor::new(options);
//! ```

use std::{cell::RefCell, fmt, str::FromStr, sync::Arc};

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use serde::{Deserialize, Serialize};

use crate::{syntax::HighlighterCache, utils::split_explicit_anchor};

/// How heading ids and the heading list are produced during compilation.
///
/// Both strategies yield the same heading sequence for the same input.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CompileStrategy {
  /// Capture headings through a renderer hook while HTML is emitted.
  #[default]
  Hook,
  /// Render first, then recover headings by scanning the HTML.
  Rescan,
}

impl CompileStrategy {
  /// Every strategy, in declaration order.
  pub const ALL: [Self; 2] = [Self::Hook, Self::Rescan];

  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Hook => "hook",
      Self::Rescan => "rescan",
    }
  }
}

impl fmt::Display for CompileStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CompileStrategy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "hook" => Ok(Self::Hook),
      "rescan" => Ok(Self::Rescan),
      other => {
        Err(format!(
          "Unknown compile strategy '{other}', expected 'hook' or 'rescan'"
        ))
      },
    }
  }
}

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
  /// Enable GitHub Flavored Markdown (GFM) extensions.
  pub gfm:            bool,
  /// Route fenced code blocks through the highlighter.
  pub highlight_code: bool,
  /// Heading capture strategy.
  pub strategy:       CompileStrategy,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      gfm:            cfg!(feature = "gfm"),
      highlight_code: true,
      strategy:       CompileStrategy::default(),
    }
  }
}

/// Builder for constructing `MarkdownOptions` with method chaining.
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable GitHub Flavored Markdown.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.gfm = enabled;
    self
  }

  /// Enable or disable syntax highlighting.
  #[must_use]
  pub const fn highlight_code(mut self, enabled: bool) -> Self {
    self.options.highlight_code = enabled;
    self
  }

  /// Choose the heading capture strategy.
  #[must_use]
  pub const fn strategy(mut self, strategy: CompileStrategy) -> Self {
    self.options.strategy = strategy;
    self
  }

  /// Build the final `MarkdownOptions`.
  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}

/// Main Markdown processor.
///
/// Cheap to clone; the highlighter is shared through an `Arc`.
#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
  pub(crate) options:     MarkdownOptions,
  pub(crate) highlighter: Option<Arc<HighlighterCache>>,
}

/// Trait for AST transformations applied between parsing and rendering.
pub trait AstTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>);
}

/// Strips trailing `{#id}` markers from headings and records the ids.
///
/// One entry is recorded per heading, in document order: `Some(id)` for an
/// explicit anchor, `None` otherwise.
#[derive(Debug, Default)]
pub struct AnchorTransformer {
  ids: RefCell<Vec<Option<String>>>,
}

impl AnchorTransformer {
  #[must_use]
  pub fn into_ids(self) -> Vec<Option<String>> {
    self.ids.into_inner()
  }
}

impl AstTransformer for AnchorTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    for descendant in node.descendants() {
      if matches!(descendant.data.borrow().value, NodeValue::Heading(_)) {
        let id = take_trailing_anchor(descendant);
        self.ids.borrow_mut().push(id);
      }
    }
  }
}

/// Replaces code blocks with the finished markup from a
/// [`HighlighterCache`].
///
/// The `<pre>` wrapper depends on whether the block itself highlighted, so the
/// whole block is produced here rather than inside comrak's renderer.
pub struct CodeBlockTransformer<'c> {
  cache: &'c HighlighterCache,
}

impl<'c> CodeBlockTransformer<'c> {
  #[must_use]
  pub const fn new(cache: &'c HighlighterCache) -> Self {
    Self { cache }
  }
}

impl AstTransformer for CodeBlockTransformer<'_> {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    for descendant in node.descendants() {
      let mut data = descendant.data.borrow_mut();
      let NodeValue::CodeBlock(block) = &data.value else {
        continue;
      };

      let language = block.info.split_whitespace().next();
      let literal = self.cache.highlight(&block.literal, language);
      data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
        block_type: 0,
        literal,
      });
    }
  }
}

/// Remove a `{#id}` marker from the trailing text of `heading`.
///
/// The marker may be split across adjacent text nodes, so every trailing text
/// node is considered together.
fn take_trailing_anchor<'a>(heading: &'a AstNode<'a>) -> Option<String> {
  let mut trailing = Vec::new();
  let mut cursor = heading.last_child();
  while let Some(child) = cursor {
    if !matches!(child.data.borrow().value, NodeValue::Text(_)) {
      break;
    }
    trailing.push(child);
    cursor = child.previous_sibling();
  }
  trailing.reverse();

  let text: String = trailing
    .iter()
    .filter_map(|child| {
      match &child.data.borrow().value {
        NodeValue::Text(text) => Some(text.to_string()),
        _ => None,
      }
    })
    .collect();

  let (stripped, id) = split_explicit_anchor(&text);
  let id = id?;

  let mut nodes = trailing.into_iter();
  if let Some(first) = nodes.next() {
    first.data.borrow_mut().value = NodeValue::Text(stripped.into());
  }
  for rest in nodes {
    rest.detach();
  }

  Some(id)
}
