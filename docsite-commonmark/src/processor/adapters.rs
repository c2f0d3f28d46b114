//! Heading hook installed into comrak's HTML formatter.

use std::{
  collections::VecDeque,
  fmt::{self, Write},
  sync::{Mutex, PoisonError},
};

use comrak::{
  adapters::{HeadingAdapter, HeadingMeta},
  nodes::Sourcepos,
};

use crate::{types::Heading, utils::generate_id};

/// Assigns ids to headings as they are rendered and records them.
///
/// Explicit ids gathered before rendering are consumed one per heading, in
/// document order.
pub struct HeadingCollector {
  explicit_ids: Mutex<VecDeque<Option<String>>>,
  headings:     Mutex<Vec<Heading>>,
}

impl HeadingCollector {
  #[must_use]
  pub fn new(explicit_ids: Vec<Option<String>>) -> Self {
    Self {
      explicit_ids: Mutex::new(explicit_ids.into()),
      headings:     Mutex::new(Vec::new()),
    }
  }

  /// Headings seen so far, in document order.
  #[must_use]
  pub fn into_headings(self) -> Vec<Heading> {
    self
      .headings
      .into_inner()
      .unwrap_or_else(PoisonError::into_inner)
  }
}

impl HeadingAdapter for HeadingCollector {
  fn enter(
    &self,
    output: &mut dyn Write,
    heading: &HeadingMeta,
    _sourcepos: Option<Sourcepos>,
  ) -> fmt::Result {
    let title = heading.content.trim();
    let explicit = self
      .explicit_ids
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .pop_front()
      .flatten();
    let id = explicit.unwrap_or_else(|| generate_id(title));

    write!(
      output,
      "<h{} id=\"{}\">",
      heading.level,
      html_escape::encode_double_quoted_attribute(&id)
    )?;

    self
      .headings
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(Heading::new(heading.level, id, title));
    Ok(())
  }

  fn exit(&self, output: &mut dyn Write, heading: &HeadingMeta) -> fmt::Result {
    writeln!(output, "</h{}>", heading.level)
  }
}
