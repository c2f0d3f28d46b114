//! Types for docsite-commonmark public API and internal use.
use serde::{Deserialize, Serialize};

/// A heading encountered while compiling a Markdown document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Heading {
  /// Heading level (1-6).
  pub level: u8,
  /// Explicit (`{#id}`) or generated anchor ID.
  pub id:    String,
  /// Heading text with inline markup removed.
  pub title: String,
}

impl Heading {
  /// Create a heading from its parts.
  #[must_use]
  pub fn new(level: u8, id: impl Into<String>, title: impl Into<String>) -> Self {
    Self {
      level,
      id: id.into(),
      title: title.into(),
    }
  }
}

/// Result of compiling a Markdown body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkdownResult {
  /// Rendered HTML output.
  pub html: String,

  /// Headings in document order (for the table of contents).
  pub headings: Vec<Heading>,

  /// Text of the first level-1 heading, if any.
  pub title: Option<String>,
}

impl MarkdownResult {
  pub(crate) fn new(html: String, headings: Vec<Heading>) -> Self {
    let title = headings
      .iter()
      .find(|heading| heading.level == 1)
      .map(|heading| heading.title.clone());
    Self {
      html,
      headings,
      title,
    }
  }
}
