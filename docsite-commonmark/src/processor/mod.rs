//! Markdown compilation.
//!
//! - [`core`]: the processor and its rendering pipeline
//! - [`types`]: options, the processor struct and AST transformers for
//!   anchors and code blocks
//! - [`adapters`]: the comrak renderer hook for headings
//! - [`rescan`]: heading recovery from rendered HTML
pub mod adapters;
pub mod core;
pub mod rescan;
pub mod types;

pub use adapters::HeadingCollector;
pub use rescan::assign_heading_ids;
pub use types::{
  AnchorTransformer,
  AstTransformer,
  CodeBlockTransformer,
  CompileStrategy,
  MarkdownOptions,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
};
