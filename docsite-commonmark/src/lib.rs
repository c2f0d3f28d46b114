//! # docsite-commonmark
//!
//! The document half of the docsite pipeline: front matter splitting,
//! CommonMark/GFM compilation with highlighted code fences and stable heading
//! ids, and table-of-contents construction.
//!
//! ## Quick Start
//!
//! ```rust
//! use docsite_commonmark::{FrontMatter, MarkdownOptions, MarkdownProcessor, build_toc};
//!
//! let raw = "---\ntitle: Guide\n---\n# Guide\n\n## Install {#setup}\n";
//! let (front_matter, _) = FrontMatter::split_lenient(raw);
//!
//! let options = MarkdownOptions {
//!   highlight_code: false,
//!   ..MarkdownOptions::default()
//! };
//! let result = MarkdownProcessor::new(options).render(&front_matter.body);
//! let toc = build_toc(&result.headings);
//!
//! assert_eq!(front_matter.title(), Some("Guide"));
//! assert_eq!(result.headings[1].id, "setup");
//! assert_eq!(toc.len(), 1);
//! ```
//!
//! ## Sharing the highlighter
//!
//! Grammar loading is expensive. Build one [`HighlighterCache`] and hand it to
//! every processor; the engine is constructed on first use, once.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use docsite_commonmark::{HighlighterCache, MarkdownOptions, MarkdownProcessor, SyntaxConfig};
//!
//! let cache = Arc::new(HighlighterCache::new(SyntaxConfig::default()));
//! let processor = MarkdownProcessor::with_highlighter(MarkdownOptions::default(), cache);
//! let result = processor.render("```rust\nfn main() {}\n```\n");
//! assert!(result.html.contains("<pre class=\"highlight\">"));
//! ```

pub mod frontmatter;
pub mod processor;
pub mod syntax;
pub mod toc;
mod types;
pub mod utils;

pub use crate::{
  frontmatter::{FrontMatter, FrontMatterError, FrontMatterFormat, MetaValue, Metadata},
  processor::{
    AstTransformer,
    CompileStrategy,
    MarkdownOptions,
    MarkdownOptionsBuilder,
    MarkdownProcessor,
  },
  syntax::{
    HighlighterCache,
    SyntaxConfig,
    SyntaxError,
    SyntaxHighlighter,
    SyntaxManager,
    SyntaxResult,
    create_default_manager,
  },
  toc::{TocNode, build_toc},
  types::{Heading, MarkdownResult},
};
